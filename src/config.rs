//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Secrets (API keys) are referenced by env-var name in the config and
//! resolved at runtime via `std::env::var`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub agent: AgentConfig,
    pub llm: LlmConfig,
    pub crawler: CrawlerConfig,
    pub providers: ProvidersConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AgentConfig {
    pub name: String,
    /// Provider consulted when a search doesn't name one.
    pub default_provider: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    /// Whether the LLM conversational path is active at all.
    /// When false the keyword fallback responses are used.
    pub enabled: bool,
    pub model: String,
    pub api_key_env: String,
    pub max_tokens: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CrawlerConfig {
    pub api_key_env: String,
    pub timeout_ms: u64,
    pub wait_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProvidersConfig {
    pub playo: PlayoConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlayoConfig {
    pub enabled: bool,
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Resolve an environment variable name to its value.
    /// Useful for loading secrets referenced in the config.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}
