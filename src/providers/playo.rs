//! Playo.co venue listing integration.
//!
//! Playo renders its listings client-side (Next.js) and embeds the full
//! page state as JSON in a `__NEXT_DATA__` script tag. The primary path
//! locates and decodes that payload; when the marker is absent (e.g.
//! after a page-template change) a degraded heuristic parser pulls
//! venue ids straight out of the markup so a search still returns
//! something, just without ratings or verified bookability.
//!
//! Listing URL: `{base_url}/venues/{city-slug}/sports/all`
//! Booking URL: `https://playo.co/booking?venueId={id}` (synthesized,
//! never taken from the payload).

use async_trait::async_trait;
use chrono::Utc;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::VenueProvider;
use crate::crawler::PageRenderer;
use crate::types::{ProviderConfig, RenderOptions, VenueError, VenueRecord};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const PLATFORM_NAME: &str = "playo";

/// The script-tag marker Playo embeds its page state under.
const PAYLOAD_MARKER: &str = "__NEXT_DATA__";

/// Marker-matching patterns in decreasing order of specificity.
/// The first structural match wins.
const MARKER_PATTERNS: [&str; 3] = [
    r#"<script id="__NEXT_DATA__" type="application/json">(.*?)</script>"#,
    r#"<script id="__NEXT_DATA__"[^>]*>(.*?)</script>"#,
    r#"<script[^>]*id="__NEXT_DATA__"[^>]*>(.*?)</script>"#,
];

/// Loose patterns for the heuristic fallback: venue ids (and adjacent
/// display names, when a second group is present) from attributes and
/// links.
const FALLBACK_PATTERNS: [&str; 3] = [
    r#"(?i)data-venue-id="([^"]+)"[^>]*>([^<]*venue[^<]*)"#,
    r#"(?i)href="/venue/([^"]+)"[^>]*>([^<]+)"#,
    r#"(?i)venueId["']?\s*:\s*["']?([^"'>\s,]+)"#,
];

fn booking_url(venue_id: &str) -> String {
    format!("https://playo.co/booking?venueId={venue_id}")
}

// ---------------------------------------------------------------------------
// Payload types (Playo JSON → Rust)
// ---------------------------------------------------------------------------

/// One entry of `props.pageProps.listData.data.venueList`.
/// Every field defaults, so only type mismatches reject an entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayoVenueEntry {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    area: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    is_bookable: bool,
    #[serde(default)]
    avg_rating: f64,
    #[serde(default)]
    rating_count: u32,
    /// Raw sport ids; resolved to names via the allSports lookup.
    #[serde(default)]
    sports: Vec<String>,
    /// URL slug for the venue detail page.
    #[serde(default)]
    active_key: String,
    #[serde(default)]
    distance: Option<f64>,
}

/// How the venue list was obtained, so callers can tell a full
/// structured decode from the degraded fallback.
#[derive(Debug)]
pub enum Extraction {
    /// Decoded from the embedded JSON payload.
    Structured(Vec<VenueRecord>),
    /// Synthesized from loose markup patterns — no ratings, no sports
    /// data, optimistically bookable.
    Heuristic(Vec<VenueRecord>),
    /// Neither path produced anything.
    Empty,
}

impl Extraction {
    pub fn into_records(self) -> Vec<VenueRecord> {
        match self {
            Extraction::Structured(v) | Extraction::Heuristic(v) => v,
            Extraction::Empty => Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Playo.co provider.
pub struct PlayoProvider {
    config: ProviderConfig,
    renderer: Arc<dyn PageRenderer>,
    render_options: RenderOptions,
    marker_patterns: Vec<Regex>,
    fallback_patterns: Vec<Regex>,
}

impl PlayoProvider {
    pub fn new(
        config: ProviderConfig,
        renderer: Arc<dyn PageRenderer>,
        render_options: RenderOptions,
    ) -> anyhow::Result<Self> {
        let marker_patterns = MARKER_PATTERNS
            .iter()
            .map(|p| Regex::new(&format!("(?s){p}")))
            .collect::<Result<Vec<_>, _>>()?;
        let fallback_patterns = FALLBACK_PATTERNS
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            config,
            renderer,
            render_options,
            marker_patterns,
            fallback_patterns,
        })
    }

    /// Default configuration for Playo.
    pub fn default_config(enabled: bool, base_url: &str) -> ProviderConfig {
        let city_mapping: HashMap<String, String> = [
            ("mumbai", "mumbai"),
            ("delhi", "delhi-ncr"),
            ("bangalore", "bangalore"),
            ("bengaluru", "bangalore"),
            ("pune", "pune"),
            ("hyderabad", "hyderabad"),
            ("chennai", "chennai"),
            ("kochi", "kochi"),
            ("kakkanad", "kakkanad"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        ProviderConfig {
            name: PLATFORM_NAME.to_string(),
            base_url: base_url.to_string(),
            enabled,
            city_mapping,
            // Declared only; nothing in this crate enforces these.
            max_requests_per_minute: 20,
            request_delay_secs: 3.0,
        }
    }

    /// Build the listing URL for a locality.
    fn build_url(&self, locality: &str) -> String {
        let slug = self.config.map_city(locality);
        format!(
            "{}/venues/{}/sports/all",
            self.config.base_url,
            urlencoding::encode(&slug)
        )
    }

    // -- Primary path: embedded JSON payload -----------------------------

    /// Locate and decode the `__NEXT_DATA__` payload.
    ///
    /// Marker absent ⇒ `PayloadMissing`. Marker present but the
    /// enclosed text doesn't parse as JSON ⇒ `PayloadMalformed` — a
    /// decode failure is reported, never silently swallowed.
    fn extract_payload(&self, markup: &str) -> Result<Value, VenueError> {
        if !markup.contains(PAYLOAD_MARKER) {
            return Err(VenueError::PayloadMissing);
        }

        for pattern in &self.marker_patterns {
            if let Some(caps) = pattern.captures(markup) {
                let json_text = unescape_entities(caps[1].trim());
                return serde_json::from_str(&json_text)
                    .map_err(|e| VenueError::PayloadMalformed(e.to_string()));
            }
        }

        // Marker string present but no pattern matched its script tag.
        Err(VenueError::PayloadMissing)
    }

    /// Walk `props.pageProps.listData.data.venueList` and normalize each
    /// entry. Missing intermediate keys yield an empty list, not an
    /// error; a malformed entry is skipped, not fatal to the batch.
    fn parse_venue_list(&self, payload: &Value) -> Vec<VenueRecord> {
        let venue_list = payload
            .pointer("/props/pageProps/listData/data/venueList")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        if venue_list.is_empty() {
            debug!(provider = PLATFORM_NAME, "No venue list in payload");
            return Vec::new();
        }

        debug!(
            provider = PLATFORM_NAME,
            entries = venue_list.len(),
            "Venue list found in payload"
        );

        let mut venues = Vec::new();
        for entry in venue_list {
            match serde_json::from_value::<PlayoVenueEntry>(entry) {
                Ok(v) => venues.push(self.normalize_entry(v)),
                Err(e) => {
                    warn!(provider = PLATFORM_NAME, error = %e, "Skipping malformed venue entry");
                }
            }
        }
        venues
    }

    /// Map one raw payload entry onto the normalized record.
    /// The booking URL is always synthesized from the id, never read
    /// from the payload. `sports_offered` still holds raw ids here.
    fn normalize_entry(&self, entry: PlayoVenueEntry) -> VenueRecord {
        let venue_url = if entry.active_key.is_empty() {
            None
        } else {
            Some(format!("https://playo.co/venue/{}", entry.active_key))
        };

        VenueRecord {
            platform: PLATFORM_NAME.to_string(),
            venue_id: Some(entry.id.clone()),
            name: entry.name,
            city: entry.city,
            area: Some(entry.area).filter(|s| !s.is_empty()),
            address: Some(entry.address).filter(|s| !s.is_empty()),
            sports_offered: entry.sports,
            rating: Some(entry.avg_rating),
            rating_count: Some(entry.rating_count),
            is_bookable: entry.is_bookable,
            booking_url: Some(booking_url(&entry.id)),
            venue_url,
            distance: entry.distance,
            last_updated: Utc::now(),
        }
    }

    /// Extract the sport-id → display-name lookup from
    /// `props.pageProps.allSports.list`. Entries missing either field
    /// are ignored.
    fn sport_name_lookup(&self, payload: &Value) -> HashMap<String, String> {
        let mut lookup = HashMap::new();
        let sports = payload
            .pointer("/props/pageProps/allSports/list")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        for sport in sports {
            let id = sport.get("sportId").and_then(value_as_string);
            let name = sport.get("name").and_then(|v| v.as_str().map(String::from));
            if let (Some(id), Some(name)) = (id, name) {
                lookup.insert(id, name);
            }
        }
        lookup
    }

    /// Replace raw sport ids with resolved names. An id absent from the
    /// lookup passes through as-is.
    fn resolve_sport_names(venues: &mut [VenueRecord], lookup: &HashMap<String, String>) {
        for venue in venues.iter_mut() {
            for sport in venue.sports_offered.iter_mut() {
                if let Some(name) = lookup.get(sport) {
                    *sport = name.clone();
                }
            }
        }
    }

    // -- Fallback path: loose markup patterns ----------------------------

    /// Heuristic extraction when the structured payload is unavailable.
    ///
    /// Surfaces venue ids (deduplicated) and adjacent display names
    /// straight from attributes and links, and synthesizes minimal
    /// records: placeholder locality fields, optimistically bookable,
    /// no sports or rating data.
    fn heuristic_venues(&self, markup: &str, locality: &str) -> Vec<VenueRecord> {
        let place = title_case(locality);
        let mut seen = HashSet::new();
        let mut venues = Vec::new();

        for pattern in &self.fallback_patterns {
            for caps in pattern.captures_iter(markup) {
                let venue_id = caps[1].to_string();
                if venue_id.is_empty() || !seen.insert(venue_id.clone()) {
                    continue;
                }

                let name = caps
                    .get(2)
                    .map(|m| m.as_str().trim().to_string())
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| format!("Venue {venue_id}"));

                venues.push(VenueRecord {
                    platform: PLATFORM_NAME.to_string(),
                    venue_id: Some(venue_id.clone()),
                    name,
                    city: place.clone(),
                    area: Some(place.clone()),
                    address: Some(format!("Address in {place}")),
                    sports_offered: Vec::new(),
                    rating: None,
                    rating_count: None,
                    // Assume bookable if the page surfaced the id at all.
                    is_bookable: true,
                    booking_url: Some(booking_url(&venue_id)),
                    venue_url: None,
                    distance: None,
                    last_updated: Utc::now(),
                });
            }
        }

        debug!(
            provider = PLATFORM_NAME,
            extracted = venues.len(),
            "Heuristic parsing extracted venue ids"
        );
        venues
    }

    // -- Combined pipeline -----------------------------------------------

    /// Extract venues from rendered markup, tagging how they were found.
    ///
    /// The heuristic path runs only when the structured decode fails
    /// entirely (marker missing or JSON undecodable) — a well-formed
    /// payload with an empty venue list stays `Structured`.
    pub fn extract_venues(&self, markup: &str, locality: &str) -> Extraction {
        match self.extract_payload(markup) {
            Ok(payload) => {
                let mut venues = self.parse_venue_list(&payload);
                let lookup = self.sport_name_lookup(&payload);
                Self::resolve_sport_names(&mut venues, &lookup);
                Extraction::Structured(venues)
            }
            Err(e) => {
                warn!(
                    provider = PLATFORM_NAME,
                    error = %e,
                    "Structured payload extraction failed, trying heuristic parser"
                );
                let venues = self.heuristic_venues(markup, locality);
                if venues.is_empty() {
                    Extraction::Empty
                } else {
                    Extraction::Heuristic(venues)
                }
            }
        }
    }
}

/// sportId appears as a string in current payloads, but tolerate
/// numeric ids too.
fn value_as_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Un-escape the four standard HTML entities.
fn unescape_entities(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}

/// Title-case a locality for placeholder display fields.
fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// VenueProvider trait implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl VenueProvider for PlayoProvider {
    fn name(&self) -> &str {
        PLATFORM_NAME
    }

    fn supported_cities(&self) -> Vec<String> {
        vec![
            "mumbai".to_string(),
            "delhi".to_string(),
            "bangalore".to_string(),
            "bengaluru".to_string(),
            "pune".to_string(),
            "hyderabad".to_string(),
            "chennai".to_string(),
            "kochi".to_string(),
            "kakkanad".to_string(),
        ]
    }

    /// Fetch and normalize all venues listed for a location.
    ///
    /// One page render, then payload extraction with heuristic
    /// fallback. A render failure is terminal for this call (no
    /// retries); an empty extraction is an empty list, not an error.
    async fn get_venue_details(&self, location: &str) -> Result<Vec<VenueRecord>, VenueError> {
        let url = self.build_url(location);
        info!(provider = PLATFORM_NAME, url = %url, "Fetching venue listing");

        let result = self
            .renderer
            .render(&url, PLATFORM_NAME, &self.render_options)
            .await;

        if !result.success {
            return Err(VenueError::Render {
                url,
                message: result
                    .error_message
                    .unwrap_or_else(|| "unknown render error".to_string()),
            });
        }

        let markup = result.markup().ok_or_else(|| VenueError::Provider {
            provider: PLATFORM_NAME.to_string(),
            message: "No HTML content received from Playo".to_string(),
        })?;

        let venues = match self.extract_venues(markup, location) {
            Extraction::Structured(v) => {
                info!(
                    provider = PLATFORM_NAME,
                    venues = v.len(),
                    confidence = "structured",
                    duration_secs = result.render_duration_secs,
                    "Venue listing parsed"
                );
                v
            }
            Extraction::Heuristic(v) => {
                info!(
                    provider = PLATFORM_NAME,
                    venues = v.len(),
                    confidence = "heuristic",
                    duration_secs = result.render_duration_secs,
                    "Venue listing parsed via fallback"
                );
                v
            }
            Extraction::Empty => {
                warn!(
                    provider = PLATFORM_NAME,
                    url = %result.url,
                    "No venue data extractable from page"
                );
                Vec::new()
            }
        };

        Ok(venues)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
