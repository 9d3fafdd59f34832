//! Firecrawl scrape-API client.
//!
//! Renders JavaScript-heavy pages through Firecrawl's hosted browser
//! and returns the captured markup in the requested formats.
//!
//! API docs: https://docs.firecrawl.dev/api-reference/endpoint/scrape
//! Base URL: https://api.firecrawl.dev/v1
//! Auth: `Authorization: Bearer {key}`

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Instant;
use tracing::{debug, warn};

use super::PageRenderer;
use crate::types::{RenderOptions, RenderResult};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const FIRECRAWL_API_URL: &str = "https://api.firecrawl.dev/v1/scrape";

/// Slack added to the HTTP client timeout on top of the per-call scrape
/// timeout, so Firecrawl's own timeout fires first and we get its error
/// text instead of a bare client timeout.
const CLIENT_TIMEOUT_SLACK_MS: u64 = 5_000;

// ---------------------------------------------------------------------------
// API types (Firecrawl JSON → Rust)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeRequest {
    url: String,
    formats: Vec<String>,
    timeout: u64,
    actions: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<ScrapeData>,
    #[serde(default)]
    error: Option<String>,
}

/// We only deserialize the content fields we use.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeData {
    #[serde(default)]
    markdown: Option<String>,
    #[serde(default)]
    html: Option<String>,
    #[serde(default)]
    raw_html: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Firecrawl-backed page renderer.
pub struct FirecrawlClient {
    http: Client,
    api_key: String,
}

impl FirecrawlClient {
    /// Create a new Firecrawl client.
    ///
    /// `default_timeout_ms` bounds how long one scrape may take; the
    /// underlying HTTP client gets a slightly longer timeout so remote
    /// errors surface with their own message.
    pub fn new(api_key: String, default_timeout_ms: u64) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_millis(
                default_timeout_ms + CLIENT_TIMEOUT_SLACK_MS,
            ))
            .user_agent("venuex/0.1.0 (sports-venue-agent)")
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client for Firecrawl: {e}"))?;

        Ok(Self { http, api_key })
    }

    /// Build the scrape request body: requested formats plus a
    /// wait-then-scrape action sequence for client-side rendering.
    fn build_request(url: &str, options: &RenderOptions) -> ScrapeRequest {
        ScrapeRequest {
            url: url.to_string(),
            formats: options.formats.clone(),
            timeout: options.timeout_ms,
            actions: vec![
                json!({ "type": "wait", "milliseconds": options.wait_ms }),
                json!({ "type": "scrape" }),
            ],
        }
    }

    async fn scrape(&self, url: &str, options: &RenderOptions) -> anyhow::Result<ScrapeData> {
        let request = Self::build_request(url, options);

        debug!(url = %url, formats = ?options.formats, "Firecrawl scrape request");

        let resp = self
            .http
            .post(FIRECRAWL_API_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Firecrawl API error {status}: {body}");
        }

        let parsed: ScrapeResponse = resp.json().await?;

        if !parsed.success {
            let cause = parsed.error.unwrap_or_else(|| "unknown error".to_string());
            anyhow::bail!("Firecrawl scrape unsuccessful: {cause}");
        }

        parsed
            .data
            .ok_or_else(|| anyhow::anyhow!("Firecrawl response missing data"))
    }
}

// ---------------------------------------------------------------------------
// PageRenderer trait implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl PageRenderer for FirecrawlClient {
    /// Render a single URL through Firecrawl.
    ///
    /// One call fetches all requested formats. Any failure — network,
    /// timeout, remote rejection — becomes a failed `RenderResult`;
    /// this boundary never propagates errors upward. No retries: the
    /// caller treats a failed render as terminal for that search.
    async fn render(&self, url: &str, platform: &str, options: &RenderOptions) -> RenderResult {
        let started = Instant::now();

        match self.scrape(url, options).await {
            Ok(data) => {
                let duration = started.elapsed().as_secs_f64();
                debug!(
                    url = %url,
                    platform = %platform,
                    duration_secs = duration,
                    raw_html_len = data.raw_html.as_ref().map(|s| s.len()).unwrap_or(0),
                    html_len = data.html.as_ref().map(|s| s.len()).unwrap_or(0),
                    "Page rendered"
                );
                RenderResult::ok(platform, url, data.raw_html, data.html, data.markdown, duration)
            }
            Err(e) => {
                let duration = started.elapsed().as_secs_f64();
                warn!(
                    url = %url,
                    platform = %platform,
                    duration_secs = duration,
                    error = %e,
                    "Page render failed"
                );
                RenderResult::failed(platform, url, format!("Failed to scrape {url}: {e}"), duration)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
