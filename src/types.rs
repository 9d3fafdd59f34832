//! Shared types for the VENUEX agent.
//!
//! These types form the data model used across all modules.
//! They are designed to be stable so that the crawler, provider,
//! and agent modules can depend on them without circular references.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Search intent
// ---------------------------------------------------------------------------

/// The (sport, location) pair derived from a free-text message.
///
/// Transient: built by the intent extractor, consumed by one venue
/// search, then discarded. `location` is always lower-cased canonical
/// (aliases such as "bengaluru" are already resolved).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchArgs {
    pub sport: String,
    pub location: String,
}

impl fmt::Display for SearchArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}", self.sport, self.location)
    }
}

// ---------------------------------------------------------------------------
// Venue records
// ---------------------------------------------------------------------------

/// Normalized, provider-agnostic representation of one bookable venue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueRecord {
    /// Provider identifier, e.g. "playo".
    pub platform: String,
    /// Provider-specific venue id, when the page exposed one.
    pub venue_id: Option<String>,
    pub name: String,
    pub city: String,
    pub area: Option<String>,
    pub address: Option<String>,
    /// Resolved sport names. Empty means "sports unknown" — callers
    /// must not filter such venues out.
    pub sports_offered: Vec<String>,
    pub rating: Option<f64>,
    /// When absent or zero the rating is display-unknown.
    pub rating_count: Option<u32>,
    pub is_bookable: bool,
    pub booking_url: Option<String>,
    pub venue_url: Option<String>,
    /// Distance from the search location, when the provider reports one.
    pub distance: Option<f64>,
    pub last_updated: DateTime<Utc>,
}

impl VenueRecord {
    /// Whether the rating should be shown at all.
    /// A zero rating count means the average is meaningless.
    pub fn has_rating(&self) -> bool {
        self.rating.unwrap_or(0.0) > 0.0 && self.rating_count.unwrap_or(0) > 0
    }

    /// Whether this venue offers the given sport.
    ///
    /// Case-insensitive containment over resolved sport names. A venue
    /// with no sports data is treated as "unknown, don't exclude".
    pub fn offers_sport(&self, sport: &str) -> bool {
        if self.sports_offered.is_empty() {
            return true;
        }
        let sport = sport.to_lowercase();
        self.sports_offered
            .iter()
            .any(|s| s.to_lowercase().contains(&sport))
    }

    /// Helper to build a test/sample venue with sensible defaults.
    #[cfg(test)]
    pub fn sample() -> Self {
        VenueRecord {
            platform: "playo".to_string(),
            venue_id: Some("ven-001".to_string()),
            name: "Marine Drive Sports Arena".to_string(),
            city: "Mumbai".to_string(),
            area: Some("Marine Lines".to_string()),
            address: Some("12 Marine Drive, Mumbai".to_string()),
            sports_offered: vec!["Cricket".to_string(), "Football".to_string()],
            rating: Some(4.5),
            rating_count: Some(132),
            is_bookable: true,
            booking_url: Some("https://playo.co/booking?venueId=ven-001".to_string()),
            venue_url: Some("https://playo.co/venue/marine-drive-sports-arena".to_string()),
            distance: Some(2.4),
            last_updated: Utc::now(),
        }
    }
}

impl fmt::Display for VenueRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({}{})",
            self.platform,
            self.name,
            self.city,
            if self.is_bookable { ", bookable" } else { "" },
        )
    }
}

/// Outbound view of a matched venue, as returned to chat clients.
///
/// Carries the requested sport and a detection timestamp alongside the
/// venue fields. Pricing and slot details need a per-venue page fetch,
/// so the static hint strings point users at the booking link instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueView {
    pub platform: String,
    pub venue_name: String,
    pub venue_id: Option<String>,
    pub city: String,
    pub area: Option<String>,
    pub address: Option<String>,
    /// The sport that was searched for.
    pub sport: String,
    pub sports_offered: Vec<String>,
    pub rating: Option<f64>,
    pub rating_count: Option<u32>,
    pub is_bookable: bool,
    pub booking_url: Option<String>,
    pub venue_url: Option<String>,
    pub price: String,
    pub time_slots: String,
    pub is_available: bool,
    pub detected_at: DateTime<Utc>,
    pub distance: Option<f64>,
}

impl VenueView {
    /// Build the outbound view for a venue matched against `sport`.
    pub fn from_record(record: &VenueRecord, sport: &str, detected_at: DateTime<Utc>) -> Self {
        VenueView {
            platform: record.platform.clone(),
            venue_name: record.name.clone(),
            venue_id: record.venue_id.clone(),
            city: record.city.clone(),
            area: record.area.clone(),
            address: record.address.clone(),
            sport: sport.to_string(),
            sports_offered: record.sports_offered.clone(),
            rating: record.rating,
            rating_count: record.rating_count,
            is_bookable: record.is_bookable,
            booking_url: record.booking_url.clone(),
            venue_url: record.venue_url.clone(),
            price: "Check venue for pricing".to_string(),
            time_slots: "Available slots vary by date".to_string(),
            is_available: record.is_bookable,
            detected_at,
            distance: record.distance,
        }
    }
}

/// The agent's reply to one chat message: the rendered text plus the
/// full structured list of matched venues (not just the ones shown).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatOutcome {
    pub response: String,
    pub slots_found: Vec<VenueView>,
}

// ---------------------------------------------------------------------------
// Page rendering
// ---------------------------------------------------------------------------

/// Per-call options for a page render.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Content formats to request, e.g. ["rawHtml", "html"].
    pub formats: Vec<String>,
    /// Overall request timeout in milliseconds.
    pub timeout_ms: u64,
    /// How long to let client-side scripts run before capture.
    pub wait_ms: u64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            formats: vec!["rawHtml".to_string(), "html".to_string()],
            timeout_ms: 30_000,
            wait_ms: 3_000,
        }
    }
}

/// Result of rendering one page.
///
/// Exactly one of the two shapes holds: `success` with at least one
/// content field populated, or `!success` with `error_message` set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderResult {
    pub platform: String,
    pub url: String,
    pub success: bool,
    pub markdown_content: Option<String>,
    pub html_content: Option<String>,
    pub raw_html_content: Option<String>,
    pub error_message: Option<String>,
    pub rendered_at: DateTime<Utc>,
    /// Wall-clock render duration in seconds, for observability.
    pub render_duration_secs: f64,
}

impl RenderResult {
    /// Successful render carrying whichever formats came back.
    pub fn ok(
        platform: &str,
        url: &str,
        raw_html: Option<String>,
        html: Option<String>,
        markdown: Option<String>,
        duration_secs: f64,
    ) -> Self {
        RenderResult {
            platform: platform.to_string(),
            url: url.to_string(),
            success: true,
            markdown_content: markdown,
            html_content: html,
            raw_html_content: raw_html,
            error_message: None,
            rendered_at: Utc::now(),
            render_duration_secs: duration_secs,
        }
    }

    /// Failed render carrying the underlying error text.
    pub fn failed(platform: &str, url: &str, error: String, duration_secs: f64) -> Self {
        RenderResult {
            platform: platform.to_string(),
            url: url.to_string(),
            success: false,
            markdown_content: None,
            html_content: None,
            raw_html_content: None,
            error_message: Some(error),
            rendered_at: Utc::now(),
            render_duration_secs: duration_secs,
        }
    }

    /// Best markup for payload extraction: raw HTML when available,
    /// otherwise the processed HTML.
    pub fn markup(&self) -> Option<&str> {
        self.raw_html_content
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.html_content.as_deref().filter(|s| !s.is_empty()))
    }
}

// ---------------------------------------------------------------------------
// Provider configuration
// ---------------------------------------------------------------------------

/// Static configuration for one provider. Immutable after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Unique provider name, the registry key.
    pub name: String,
    pub base_url: String,
    pub enabled: bool,
    /// Canonical city → provider URL slug (e.g. delhi → delhi-ncr).
    pub city_mapping: HashMap<String, String>,
    /// Declared rate limit. Not enforced by this crate.
    pub max_requests_per_minute: u32,
    /// Declared delay between requests in seconds. Not enforced.
    pub request_delay_secs: f64,
}

impl ProviderConfig {
    /// Map a city name to the provider's URL slug.
    /// Unknown cities pass through lower-cased.
    pub fn map_city(&self, city: &str) -> String {
        let key = city.to_lowercase();
        self.city_mapping.get(&key).cloned().unwrap_or(key)
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for VENUEX.
///
/// Every boundary below `process_message` reports through these so
/// failure causes stay inspectable in tests; the agent converts them
/// into "no results" outcomes before anything reaches the end user.
#[derive(Debug, thiserror::Error)]
pub enum VenueError {
    #[error("Provider '{0}' not available or disabled")]
    ProviderUnavailable(String),

    #[error("Provider '{provider}' does not support location '{location}'")]
    UnsupportedLocation { provider: String, location: String },

    #[error("Render failed for {url}: {message}")]
    Render { url: String, message: String },

    #[error("No embedded payload found in page markup")]
    PayloadMissing,

    #[error("Embedded payload could not be decoded: {0}")]
    PayloadMalformed(String),

    #[error("Provider error ({provider}): {message}")]
    Provider { provider: String, message: String },

    #[error("LLM error ({model}): {message}")]
    Llm { model: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
