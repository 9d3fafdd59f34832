//! Response composition — venue lists and fallback prompts to chat text.
//!
//! Pure functions: every end-user-visible message the agent can produce
//! comes from one of the four templates here. The structured list in a
//! `ChatOutcome` always carries *all* matched venues, even though the
//! text only enumerates the first few.

use crate::types::{ChatOutcome, VenueView};

/// How many venues the text summary enumerates; the rest are counted.
const MAX_LISTED: usize = 3;

/// Compose the reply for a completed search.
///
/// Non-empty venues get a count header, the top `MAX_LISTED` entries
/// (rating line omitted when the rating is zero or unknown), a "+N
/// more" line when applicable, and a trailer pointing at the structured
/// list. Empty venues get the "not found" message with suggested
/// causes. The views are passed through to the outcome unchanged.
pub fn compose_results(sport: &str, location: &str, venues: &[VenueView]) -> ChatOutcome {
    if venues.is_empty() {
        return ChatOutcome {
            response: format!(
                "❌ No venues found for {sport} in {location}. This could be due to:\n\n\
                 1. No venues available in this area\n\
                 2. Scraping temporarily unavailable\n\
                 3. Try a different city (Mumbai, Delhi, Bangalore, Kakkanad)"
            ),
            slots_found: Vec::new(),
        };
    }

    let mut response = format!(
        "🔍 Found {} venues for {sport} in {location}:\n\n",
        venues.len()
    );

    for (i, venue) in venues.iter().take(MAX_LISTED).enumerate() {
        let status = if venue.is_bookable {
            "✅ Available"
        } else {
            "❌ Not Available"
        };

        response.push_str(&format!(
            "{}. **{}** ({})\n",
            i + 1,
            venue.venue_name,
            venue.platform
        ));
        let rating = venue.rating.unwrap_or(0.0);
        if rating > 0.0 {
            response.push_str(&format!("   ⭐ {rating:.1}/5\n"));
        }
        response.push_str(&format!("   {status}\n\n"));
    }

    if venues.len() > MAX_LISTED {
        response.push_str(&format!(
            "... and {} more venues\n\n",
            venues.len() - MAX_LISTED
        ));
    }

    response.push_str("📋 See all venues below with booking links!");

    ChatOutcome {
        response,
        slots_found: venues.to_vec(),
    }
}

/// Prompt for a message that named a sport but no resolvable location.
pub fn compose_sport_only_prompt() -> ChatOutcome {
    ChatOutcome {
        response: "I can help you find sports venues! Please specify both the sport and location, like:\n\
                   • 'Find cricket venues in Mumbai'\n\
                   • 'Show badminton courts in Kakkanad'"
            .to_string(),
        slots_found: Vec::new(),
    }
}

/// Generic greeting for a message with no recognizable search intent.
pub fn compose_greeting() -> ChatOutcome {
    ChatOutcome {
        response: "Hello! I'm your sports booking assistant. 🏏 I help you find the perfect venues for \
                   cricket, football, and badminton.\n\n\
                   For the best results, please include:\n\
                   • Sport (cricket, football, or badminton)\n\
                   • Location (Mumbai, Delhi, Bangalore, or Kakkanad)\n\
                   • When (today, tomorrow, weekend, specific date/time)\n\n\
                   Try asking something like \"Find cricket venues in Mumbai for this weekend\" or \
                   \"I need badminton courts in Kakkanad tomorrow evening\""
            .to_string(),
        slots_found: Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
