//! Agent router — the conversational front door.
//!
//! One entry point, `process_message`: extract search intent, run the
//! venue search, compose a reply. Venue-search failures never escape
//! this boundary — they are logged with their typed cause and surfaced
//! to the user as one of the composed "no results" messages.

pub mod composer;
pub mod intent;

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::llm::ChatModel;
use crate::service::VenueService;
use crate::types::{ChatOutcome, SearchArgs, VenueView};

/// System prompt for the optional LLM conversational path.
const LLM_SYSTEM_PROMPT: &str = "\
You are a sports venue finder agent. Help users find cricket, football, and badminton venues.
You can search in Mumbai, Delhi, Bangalore, and Kakkanad.

If the user asks about sports venues, guide them to be more specific about:
- Sport type (cricket, football, badminton)
- Location (city name)

For non-sports queries, politely redirect to sports venue finding.";

/// Routes chat messages to venue search or fallback responses.
pub struct AgentRouter {
    venues: VenueService,
    /// Optional conversational model for messages with no search
    /// intent. Absent (the default) means keyword fallbacks answer.
    llm: Option<Arc<dyn ChatModel>>,
}

impl AgentRouter {
    pub fn new(venues: VenueService, llm: Option<Arc<dyn ChatModel>>) -> Self {
        Self { venues, llm }
    }

    /// Process one chat message and return the reply plus any venues
    /// found. Never fails for venue-search problems; those become empty
    /// results with an explanatory message.
    pub async fn process_message(&self, message: &str, user_id: &str) -> ChatOutcome {
        debug!(user_id = %user_id, "Processing message");

        if let Some(args) = intent::extract(message) {
            let venues = self.search_venues(&args).await;
            info!(
                user_id = %user_id,
                sport = %args.sport,
                location = %args.location,
                venues = venues.len(),
                "Venue search completed"
            );
            return composer::compose_results(&args.sport, &args.location, &venues);
        }

        // No search intent. Let the LLM answer when one is configured;
        // otherwise (or on LLM failure) use the keyword fallbacks.
        if let Some(llm) = &self.llm {
            match llm.chat(LLM_SYSTEM_PROMPT, message).await {
                Ok(reply) => {
                    return ChatOutcome {
                        response: reply,
                        slots_found: Vec::new(),
                    };
                }
                Err(e) => {
                    warn!(user_id = %user_id, error = %e, "LLM reply failed, using fallback");
                }
            }
        }

        if intent::mentions_sport(message) {
            composer::compose_sport_only_prompt()
        } else {
            composer::compose_greeting()
        }
    }

    /// Run the venue search and filter by the requested sport.
    ///
    /// All typed provider errors collapse to an empty list here; the
    /// cause stays in the logs, never in the user-visible reply.
    async fn search_venues(&self, args: &SearchArgs) -> Vec<VenueView> {
        let records = match self.venues.get_venue_details(&args.location, None).await {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    sport = %args.sport,
                    location = %args.location,
                    error = %e,
                    "Venue search failed"
                );
                return Vec::new();
            }
        };

        let detected_at = Utc::now();
        records
            .iter()
            .filter(|r| r.offers_sport(&args.sport))
            .map(|r| VenueView::from_record(r, &args.sport, detected_at))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
