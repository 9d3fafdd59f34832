//! Venue service — the search facade over the provider registry.
//!
//! Checks provider availability and location support before delegating
//! to the provider, so callers see one typed-error surface regardless
//! of which check failed.

use std::sync::Arc;
use tracing::debug;

use crate::providers::ProviderRegistry;
use crate::types::{VenueError, VenueRecord};

/// Service for getting venue details from registered providers.
pub struct VenueService {
    registry: ProviderRegistry,
    default_provider: String,
}

impl VenueService {
    /// Create a venue service owning the given registry.
    pub fn new(registry: ProviderRegistry, default_provider: impl Into<String>) -> Self {
        Self {
            registry,
            default_provider: default_provider.into(),
        }
    }

    /// Get venue details for a location.
    ///
    /// `location` must already be lower-cased canonical (the intent
    /// extractor guarantees this). `provider_name` falls back to the
    /// configured default when absent.
    pub async fn get_venue_details(
        &self,
        location: &str,
        provider_name: Option<&str>,
    ) -> Result<Vec<VenueRecord>, VenueError> {
        let name = provider_name.unwrap_or(&self.default_provider);

        let provider = self
            .registry
            .get(name)
            .ok_or_else(|| VenueError::ProviderUnavailable(name.to_string()))?;

        let location = location.to_lowercase();
        if !provider.supported_cities().contains(&location) {
            return Err(VenueError::UnsupportedLocation {
                provider: name.to_string(),
                location,
            });
        }

        debug!(provider = %name, location = %location, "Dispatching venue search");
        provider.get_venue_details(&location).await
    }

    /// Supported cities for a provider (empty when unavailable).
    pub fn supported_cities(&self, provider_name: Option<&str>) -> Vec<String> {
        let name = provider_name.unwrap_or(&self.default_provider);
        self.registry
            .get(name)
            .map(|p| p.supported_cities())
            .unwrap_or_default()
    }

    /// Names of all enabled providers.
    pub fn available_providers(&self) -> Vec<String> {
        self.registry.enabled_providers()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
