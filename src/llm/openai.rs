//! OpenAI chat-completions client.
//!
//! Targets the Chat Completions API with temperature 0 — replies here
//! guide users toward a well-formed venue search, so determinism beats
//! variety.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ChatModel;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o";
const DEFAULT_MAX_TOKENS: u32 = 512;
const REQUEST_TIMEOUT_SECS: u64 = 60;

// ---------------------------------------------------------------------------
// API types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChatMessage>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct OpenAiChat {
    http: Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiChat {
    pub fn new(api_key: String, model: Option<String>, max_tokens: Option<u32>) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build OpenAI HTTP client")?;

        Ok(Self {
            http,
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        })
    }
}

#[async_trait]
impl ChatModel for OpenAiChat {
    async fn chat(&self, system: &str, user_message: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: 0.0,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_message.to_string(),
                },
            ],
        };

        debug!(model = %self.model, "OpenAI chat request");

        let resp = self
            .http
            .post(OPENAI_API_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("OpenAI API request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI API error {status}: {body}");
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .context("Failed to parse OpenAI chat response")?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .map(|m| m.content)
            .context("OpenAI response contained no choices")
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_client_defaults() {
        let client = OpenAiChat::new("sk-test".to_string(), None, None).unwrap();
        assert_eq!(client.model_name(), "gpt-4o");
        assert_eq!(client.max_tokens, 512);
    }

    #[test]
    fn test_new_client_overrides() {
        let client =
            OpenAiChat::new("sk-test".to_string(), Some("gpt-4o-mini".to_string()), Some(256))
                .unwrap();
        assert_eq!(client.model_name(), "gpt-4o-mini");
        assert_eq!(client.max_tokens, 256);
    }

    #[test]
    fn test_chat_response_parses() {
        let raw = r#"{
            "choices": [
                { "message": { "role": "assistant", "content": "Try cricket in Mumbai." } }
            ]
        }"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            parsed.choices[0].message.as_ref().unwrap().content,
            "Try cricket in Mumbai."
        );
    }

    #[test]
    fn test_chat_response_empty_choices() {
        let parsed: ChatResponse = serde_json::from_str(r#"{ "choices": [] }"#).unwrap();
        assert!(parsed.choices.is_empty());
    }
}
