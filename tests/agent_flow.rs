//! End-to-end agent flow over deterministic in-memory collaborators.
//!
//! Wires a real Playo provider to a mock page renderer serving
//! synthetic markup, registers it in a real registry, and drives the
//! full chat path: message → intent → render → payload extraction →
//! sport filter → composed reply.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use venuex::agent::AgentRouter;
use venuex::crawler::PageRenderer;
use venuex::providers::playo::PlayoProvider;
use venuex::providers::{ProviderRegistry, VenueProvider};
use venuex::service::VenueService;
use venuex::types::{RenderOptions, RenderResult};

// ---------------------------------------------------------------------------
// Mock renderer
// ---------------------------------------------------------------------------

/// A renderer serving canned pages, with a forced-failure switch.
///
/// All state is in-memory; requested URLs are recorded so tests can
/// assert which listing page a search hit.
struct MockRenderer {
    page: Mutex<String>,
    force_error: Mutex<Option<String>>,
    requested_urls: Mutex<Vec<String>>,
}

impl MockRenderer {
    fn new(page: &str) -> Self {
        Self {
            page: Mutex::new(page.to_string()),
            force_error: Mutex::new(None),
            requested_urls: Mutex::new(Vec::new()),
        }
    }

    fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    fn requested_urls(&self) -> Vec<String> {
        self.requested_urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageRenderer for MockRenderer {
    async fn render(&self, url: &str, platform: &str, _options: &RenderOptions) -> RenderResult {
        self.requested_urls.lock().unwrap().push(url.to_string());

        if let Some(msg) = self.force_error.lock().unwrap().clone() {
            return RenderResult::failed(platform, url, msg, 0.1);
        }

        let page = self.page.lock().unwrap().clone();
        RenderResult::ok(platform, url, Some(page), None, None, 0.1)
    }
}

// ---------------------------------------------------------------------------
// Synthetic pages
// ---------------------------------------------------------------------------

/// A well-formed listing page: four venues, two offering cricket, one
/// football-only, one badminton-only, plus the sport-id lookup.
fn structured_page() -> String {
    let payload = serde_json::json!({
        "props": {
            "pageProps": {
                "listData": { "data": { "venueList": [
                    {
                        "id": "mum-1",
                        "name": "Wankhede Practice Nets",
                        "area": "Churchgate",
                        "city": "Mumbai",
                        "address": "D Road, Churchgate",
                        "isBookable": true,
                        "avgRating": 4.6,
                        "ratingCount": 412,
                        "sports": ["SP1"],
                        "activeKey": "wankhede-practice-nets"
                    },
                    {
                        "id": "mum-2",
                        "name": "Azad Maidan Turf",
                        "area": "Fort",
                        "city": "Mumbai",
                        "address": "Mahapalika Marg",
                        "isBookable": true,
                        "avgRating": 4.2,
                        "ratingCount": 96,
                        "sports": ["SP1", "SP2"],
                        "activeKey": "azad-maidan-turf"
                    },
                    {
                        "id": "mum-3",
                        "name": "Juhu Football Arena",
                        "area": "Juhu",
                        "city": "Mumbai",
                        "address": "Juhu Tara Road",
                        "isBookable": false,
                        "avgRating": 0.0,
                        "ratingCount": 0,
                        "sports": ["SP2"],
                        "activeKey": "juhu-football-arena"
                    },
                    {
                        "id": "mum-4",
                        "name": "Dadar Shuttle Hall",
                        "area": "Dadar",
                        "city": "Mumbai",
                        "address": "Tilak Bridge Rd",
                        "isBookable": true,
                        "avgRating": 3.9,
                        "ratingCount": 58,
                        "sports": ["SP3"],
                        "activeKey": "dadar-shuttle-hall"
                    }
                ] } },
                "allSports": { "list": [
                    { "sportId": "SP1", "name": "Cricket" },
                    { "sportId": "SP2", "name": "Football" },
                    { "sportId": "SP3", "name": "Badminton" }
                ] }
            }
        }
    });
    format!(
        r#"<html><body><script id="__NEXT_DATA__" type="application/json">{payload}</script></body></html>"#
    )
}

/// A page after a template change: no `__NEXT_DATA__` marker, venue
/// ids only reachable through links.
fn markerless_page() -> String {
    r#"<html><body>
        <a href="/venue/old-1" class="venue-card">Carter Road Grounds</a>
        <a href="/venue/old-2" class="venue-card">Bandra Gymkhana</a>
    </body></html>"#
        .to_string()
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

fn agent_over(renderer: Arc<MockRenderer>) -> AgentRouter {
    let mut registry = ProviderRegistry::new();
    let config = PlayoProvider::default_config(true, "https://playo.co");

    registry.register(
        config,
        Box::new(move |config| {
            let provider = PlayoProvider::new(
                config.clone(),
                renderer.clone() as Arc<dyn PageRenderer>,
                RenderOptions::default(),
            )?;
            Ok(Arc::new(provider) as Arc<dyn VenueProvider>)
        }),
    );

    AgentRouter::new(VenueService::new(registry, "playo"), None)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cricket_search_returns_only_cricket_venues() {
    let renderer = Arc::new(MockRenderer::new(&structured_page()));
    let agent = agent_over(renderer.clone());

    let outcome = agent
        .process_message("Find cricket venues in Mumbai", "user-1")
        .await;

    // Two of four venues offer cricket
    assert_eq!(outcome.slots_found.len(), 2);
    assert!(outcome.response.contains("Found 2 venues for cricket in mumbai"));
    assert!(outcome.response.contains("**Wankhede Practice Nets** (playo)"));
    assert!(outcome.response.contains("⭐ 4.6/5"));
    assert!(outcome.response.contains("✅ Available"));

    // Sport lists hold resolved names, not raw ids
    for slot in &outcome.slots_found {
        assert!(slot.sports_offered.iter().any(|s| s == "Cricket"));
        assert!(slot.sports_offered.iter().all(|s| !s.starts_with("SP")));
    }

    // The search hit the mapped listing URL
    assert_eq!(
        renderer.requested_urls(),
        vec!["https://playo.co/venues/mumbai/sports/all".to_string()]
    );
}

#[tokio::test]
async fn badminton_search_finds_single_venue() {
    let renderer = Arc::new(MockRenderer::new(&structured_page()));
    let agent = agent_over(renderer);

    let outcome = agent
        .process_message("badminton courts in mumbai please", "user-2")
        .await;

    assert_eq!(outcome.slots_found.len(), 1);
    assert_eq!(outcome.slots_found[0].venue_name, "Dadar Shuttle Hall");
    assert_eq!(
        outcome.slots_found[0].booking_url.as_deref(),
        Some("https://playo.co/booking?venueId=mum-4")
    );
}

#[tokio::test]
async fn alias_city_routes_to_canonical_listing() {
    let renderer = Arc::new(MockRenderer::new(&structured_page()));
    let agent = agent_over(renderer.clone());

    agent
        .process_message("football in bengaluru", "user-3")
        .await;

    // bengaluru canonicalizes to bangalore before the provider maps it
    assert_eq!(
        renderer.requested_urls(),
        vec!["https://playo.co/venues/bangalore/sports/all".to_string()]
    );
}

#[tokio::test]
async fn markerless_page_degrades_to_heuristic_records() {
    let renderer = Arc::new(MockRenderer::new(&markerless_page()));
    let agent = agent_over(renderer);

    let outcome = agent
        .process_message("cricket in mumbai", "user-4")
        .await;

    // Heuristic venues have no sports data, so the sport filter keeps
    // them all; both are optimistically bookable with synthesized URLs.
    assert_eq!(outcome.slots_found.len(), 2);
    for slot in &outcome.slots_found {
        assert!(slot.is_bookable);
        assert!(slot.sports_offered.is_empty());
        assert!(slot
            .booking_url
            .as_deref()
            .unwrap()
            .starts_with("https://playo.co/booking?venueId=old-"));
    }
    assert!(outcome.response.contains("Found 2 venues"));
}

#[tokio::test]
async fn render_failure_surfaces_as_not_found() {
    let renderer = Arc::new(MockRenderer::new(&structured_page()));
    renderer.set_error("upstream 502");
    let agent = agent_over(renderer);

    let outcome = agent.process_message("cricket in mumbai", "user-5").await;

    assert!(outcome.slots_found.is_empty());
    assert!(outcome.response.contains("No venues found for cricket in mumbai"));
    // Raw error text stays out of the user-visible reply
    assert!(!outcome.response.contains("502"));
}

#[tokio::test]
async fn unsupported_city_is_absorbed() {
    let renderer = Arc::new(MockRenderer::new(&structured_page()));
    let agent = agent_over(renderer.clone());

    let outcome = agent
        .process_message("cricket venues in trivandrum", "user-6")
        .await;

    // trivandrum is a recognized city token but not a Playo city, so
    // the search never renders anything and composes "not found".
    assert!(outcome.slots_found.is_empty());
    assert!(outcome.response.contains("No venues found"));
    assert!(renderer.requested_urls().is_empty());
}

#[tokio::test]
async fn fallback_prompts_for_partial_and_missing_intent() {
    let renderer = Arc::new(MockRenderer::new(&structured_page()));
    let agent = agent_over(renderer);

    let sport_only = agent.process_message("any football slots?", "user-7").await;
    assert!(sport_only.response.contains("both the sport and location"));
    assert!(sport_only.slots_found.is_empty());

    let no_intent = agent.process_message("good morning!", "user-7").await;
    assert!(no_intent.response.contains("sports booking assistant"));
    assert!(no_intent.slots_found.is_empty());
}

#[tokio::test]
async fn provider_instance_is_reused_across_searches() {
    let renderer = Arc::new(MockRenderer::new(&structured_page()));
    let agent = agent_over(renderer.clone());

    agent.process_message("cricket in mumbai", "user-8").await;
    agent.process_message("cricket in mumbai", "user-8").await;

    // Two searches, two renders, one lazily-built provider behind them
    assert_eq!(renderer.requested_urls().len(), 2);
}
