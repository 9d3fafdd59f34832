//! Venue listing providers.
//!
//! Defines the `VenueProvider` trait and the registry that owns
//! provider instances. Currently one integration exists:
//! - Playo (playo.co) — Indian sports venue booking platform

pub mod playo;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::types::{ProviderConfig, VenueError, VenueRecord};

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// Abstraction over venue-listing platforms.
///
/// Implementors expose the cities they cover and fetch normalized venue
/// records for one of them. Locations passed to `get_venue_details` are
/// always lower-cased; the provider maps them to its own URL scheme.
#[async_trait]
pub trait VenueProvider: Send + Sync {
    /// Provider name for logging and identification.
    fn name(&self) -> &str;

    /// City identifiers this provider can search.
    fn supported_cities(&self) -> Vec<String>;

    /// Fetch all venues listed for the given location.
    async fn get_venue_details(&self, location: &str) -> Result<Vec<VenueRecord>, VenueError>;
}

/// Builds a provider instance from its config on first use.
pub type ProviderConstructor =
    Box<dyn Fn(&ProviderConfig) -> anyhow::Result<Arc<dyn VenueProvider>> + Send + Sync>;

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Explicitly constructed registry of named providers.
///
/// Registration stores config + constructor only; the instance is built
/// lazily on the first `get` and cached for the registry's lifetime.
/// There is no refresh or invalidation — provider instances are
/// stateless value-holders, so one per name is enough.
pub struct ProviderRegistry {
    configs: HashMap<String, ProviderConfig>,
    constructors: HashMap<String, ProviderConstructor>,
    instances: Mutex<HashMap<String, Arc<dyn VenueProvider>>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            configs: HashMap::new(),
            constructors: HashMap::new(),
            instances: Mutex::new(HashMap::new()),
        }
    }

    /// Register a provider under its config's name.
    /// No instance is constructed at registration time.
    pub fn register(&mut self, config: ProviderConfig, constructor: ProviderConstructor) {
        info!(
            provider = %config.name,
            enabled = config.enabled,
            max_requests_per_minute = config.max_requests_per_minute,
            "Provider registered"
        );
        self.constructors.insert(config.name.clone(), constructor);
        self.configs.insert(config.name.clone(), config);
    }

    /// Get the live instance for a provider name.
    ///
    /// Returns `None` for unknown or disabled names, and for
    /// construction failures (which are logged, not propagated) —
    /// callers must check.
    pub fn get(&self, name: &str) -> Option<Arc<dyn VenueProvider>> {
        let mut instances = self.instances.lock().unwrap();
        if let Some(instance) = instances.get(name) {
            return Some(Arc::clone(instance));
        }

        let config = self.configs.get(name)?;
        if !config.enabled {
            debug!(provider = %name, "Provider disabled, not constructing");
            return None;
        }
        let constructor = self.constructors.get(name)?;

        match constructor(config) {
            Ok(instance) => {
                instances.insert(name.to_string(), Arc::clone(&instance));
                info!(provider = %name, "Provider instance constructed");
                Some(instance)
            }
            Err(e) => {
                warn!(provider = %name, error = %e, "Provider construction failed");
                None
            }
        }
    }

    /// Names of all registered providers whose config is enabled.
    pub fn enabled_providers(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .configs
            .values()
            .filter(|c| c.enabled)
            .map(|c| c.name.clone())
            .collect();
        names.sort();
        names
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubProvider {
        name: String,
    }

    #[async_trait]
    impl VenueProvider for StubProvider {
        fn name(&self) -> &str {
            &self.name
        }

        fn supported_cities(&self) -> Vec<String> {
            vec!["mumbai".to_string()]
        }

        async fn get_venue_details(&self, _location: &str) -> Result<Vec<VenueRecord>, VenueError> {
            Ok(Vec::new())
        }
    }

    fn stub_config(name: &str, enabled: bool) -> ProviderConfig {
        ProviderConfig {
            name: name.to_string(),
            base_url: "https://example.com".to_string(),
            enabled,
            city_mapping: HashMap::new(),
            max_requests_per_minute: 30,
            request_delay_secs: 1.0,
        }
    }

    fn stub_constructor(builds: Arc<AtomicUsize>) -> ProviderConstructor {
        Box::new(move |config| {
            builds.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(StubProvider {
                name: config.name.clone(),
            }) as Arc<dyn VenueProvider>)
        })
    }

    #[test]
    fn test_get_unknown_provider_is_none() {
        let registry = ProviderRegistry::new();
        assert!(registry.get("nowhere").is_none());
    }

    #[test]
    fn test_get_disabled_provider_is_none() {
        let builds = Arc::new(AtomicUsize::new(0));
        let mut registry = ProviderRegistry::new();
        registry.register(stub_config("playo", false), stub_constructor(builds.clone()));

        assert!(registry.get("playo").is_none());
        assert_eq!(builds.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_instance_built_lazily_and_cached() {
        let builds = Arc::new(AtomicUsize::new(0));
        let mut registry = ProviderRegistry::new();
        registry.register(stub_config("playo", true), stub_constructor(builds.clone()));

        // Registration alone builds nothing
        assert_eq!(builds.load(Ordering::SeqCst), 0);

        let first = registry.get("playo").unwrap();
        let second = registry.get("playo").unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_construction_failure_is_none_not_panic() {
        let mut registry = ProviderRegistry::new();
        registry.register(
            stub_config("broken", true),
            Box::new(|_| anyhow::bail!("construction exploded")),
        );
        assert!(registry.get("broken").is_none());
    }

    #[test]
    fn test_enabled_providers_filters_disabled() {
        let builds = Arc::new(AtomicUsize::new(0));
        let mut registry = ProviderRegistry::new();
        registry.register(stub_config("playo", true), stub_constructor(builds.clone()));
        registry.register(stub_config("dormant", false), stub_constructor(builds));

        assert_eq!(registry.enabled_providers(), vec!["playo".to_string()]);
    }
}
