//! LLM integration for conversational replies.
//!
//! Defines the `ChatModel` trait and an OpenAI implementation. The
//! agent works without any model at all — keyword fallbacks cover every
//! path — so this seam ships disabled by default in `config.toml`.

pub mod openai;

use anyhow::Result;
use async_trait::async_trait;

/// Abstraction over chat-completion models.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send one system + user message pair, return the reply text.
    async fn chat(&self, system: &str, user_message: &str) -> Result<String>;

    /// Model identifier string.
    fn model_name(&self) -> &str;
}
