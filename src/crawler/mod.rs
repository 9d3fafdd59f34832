//! Page rendering.
//!
//! Defines the `PageRenderer` trait and provides the Firecrawl-backed
//! implementation. Rendering is the one outbound network call a venue
//! search makes: fetch a JavaScript-heavy listing page, let it hydrate,
//! and hand back the captured markup.

pub mod firecrawl;

use async_trait::async_trait;

use crate::types::{RenderOptions, RenderResult};

/// Abstraction over page-rendering services.
///
/// Implementors fetch a URL, execute its client-side script long enough
/// for content to populate, and return the captured markup. This
/// boundary never raises: any failure comes back as a failed
/// `RenderResult` carrying the underlying error text.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Render a single URL and capture its markup.
    ///
    /// `platform` is the provider name the render is on behalf of,
    /// recorded on the result for logging and attribution.
    async fn render(&self, url: &str, platform: &str, options: &RenderOptions) -> RenderResult;
}
