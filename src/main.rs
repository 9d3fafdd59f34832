//! VENUEX — Conversational Sports Venue Finder Agent
//!
//! Entry point. Loads configuration, initialises structured logging,
//! wires the provider registry and agent router, and serves the chat
//! API.

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use venuex::agent::AgentRouter;
use venuex::config::{self, AppConfig};
use venuex::crawler::firecrawl::FirecrawlClient;
use venuex::crawler::PageRenderer;
use venuex::llm::openai::OpenAiChat;
use venuex::llm::ChatModel;
use venuex::providers::playo::PlayoProvider;
use venuex::providers::{ProviderRegistry, VenueProvider};
use venuex::server;
use venuex::service::VenueService;
use venuex::types::RenderOptions;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    // Load configuration from TOML
    let cfg = config::AppConfig::load("config.toml")?;

    // Initialise structured logging
    init_logging();

    info!(
        agent_name = %cfg.agent.name,
        default_provider = %cfg.agent.default_provider,
        port = cfg.server.port,
        "VENUEX starting up"
    );

    // -- Provider registry ------------------------------------------------

    let mut registry = ProviderRegistry::new();

    let playo_config = PlayoProvider::default_config(
        cfg.providers.playo.enabled,
        &cfg.providers.playo.base_url,
    );

    if playo_config.enabled {
        let api_key = AppConfig::resolve_env(&cfg.crawler.api_key_env)?;
        let render_options = RenderOptions {
            timeout_ms: cfg.crawler.timeout_ms,
            wait_ms: cfg.crawler.wait_ms,
            ..RenderOptions::default()
        };
        let timeout_ms = cfg.crawler.timeout_ms;

        registry.register(
            playo_config,
            Box::new(move |config| {
                let renderer: Arc<dyn PageRenderer> =
                    Arc::new(FirecrawlClient::new(api_key.clone(), timeout_ms)?);
                let provider =
                    PlayoProvider::new(config.clone(), renderer, render_options.clone())?;
                Ok(Arc::new(provider) as Arc<dyn VenueProvider>)
            }),
        );
    } else {
        registry.register(playo_config, Box::new(|_| anyhow::bail!("playo disabled")));
    }

    let venues = VenueService::new(registry, cfg.agent.default_provider.clone());

    // -- Optional LLM -----------------------------------------------------

    let llm: Option<Arc<dyn ChatModel>> = if cfg.llm.enabled {
        match AppConfig::resolve_env(&cfg.llm.api_key_env) {
            Ok(key) => {
                let chat = OpenAiChat::new(key, Some(cfg.llm.model.clone()), Some(cfg.llm.max_tokens))?;
                info!(model = %cfg.llm.model, "LLM conversational path enabled");
                Some(Arc::new(chat))
            }
            Err(e) => {
                warn!(error = %e, "LLM enabled but key unresolved, using keyword fallbacks");
                None
            }
        }
    } else {
        None
    };

    // -- Serve ------------------------------------------------------------

    let agent = Arc::new(AgentRouter::new(venues, llm));
    server::serve(agent, cfg.server.port).await
}

fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("venuex=info"));

    let json_logging = std::env::var("VENUEX_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        fmt().with_env_filter(env_filter).with_target(true).init();
    }
}
