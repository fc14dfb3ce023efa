//! Chat model provider abstraction.
//!
//! The assistant talks to a [`ChatModel`]; which one is chosen by
//! `[assistant].provider`:
//!
//! | Provider | Type | Behavior |
//! |----------|------|----------|
//! | `disabled` | [`DisabledModel`] | Every call fails, so the assistant answers with its fallback text |
//! | `anthropic` | [`AnthropicModel`] | `POST {api_base}/v1/messages` |
//!
//! Calls are made once with the configured timeout. Callers decide what a
//! failure means; nothing here retries.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use care_directory_core::models::{ChatMessage, ChatRole};

use crate::config::AssistantConfig;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// A conversational model that turns a history into one reply.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Provider name used in logs.
    fn name(&self) -> &str;

    /// Produce the assistant's next message for `messages` under `system`.
    async fn complete(&self, system: &str, messages: &[ChatMessage]) -> Result<String>;
}

/// Build the model selected by `config.provider`.
pub fn create_model(config: &AssistantConfig) -> Result<Arc<dyn ChatModel>> {
    match config.provider.as_str() {
        "disabled" => Ok(Arc::new(DisabledModel)),
        "anthropic" => Ok(Arc::new(AnthropicModel::new(config)?)),
        other => bail!("Unknown assistant provider: {}", other),
    }
}

// ============ Disabled ============

pub struct DisabledModel;

#[async_trait]
impl ChatModel for DisabledModel {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn complete(&self, _system: &str, _messages: &[ChatMessage]) -> Result<String> {
        bail!("Assistant provider is disabled")
    }
}

// ============ Anthropic ============

/// Anthropic Messages API client. Requires `ANTHROPIC_API_KEY`.
pub struct AnthropicModel {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicModel {
    pub fn new(config: &AssistantConfig) -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| anyhow::anyhow!("ANTHROPIC_API_KEY environment variable not set"))?;
        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(config: &AssistantConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Wire messages for the API: the conversation must open with a user turn,
/// so leading assistant messages (the greeting) are skipped.
fn wire_messages(messages: &[ChatMessage]) -> Vec<WireMessage<'_>> {
    messages
        .iter()
        .skip_while(|m| m.role == ChatRole::Assistant)
        .map(|m| WireMessage {
            role: m.role.as_str(),
            content: &m.content,
        })
        .collect()
}

fn first_text(response: MessagesResponse) -> Result<String> {
    response
        .content
        .into_iter()
        .find(|b| b.kind == "text")
        .and_then(|b| b.text)
        .ok_or_else(|| anyhow::anyhow!("Anthropic response has no text content"))
}

#[async_trait]
impl ChatModel for AnthropicModel {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, system: &str, messages: &[ChatMessage]) -> Result<String> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system,
            messages: wire_messages(messages),
        };
        if body.messages.is_empty() {
            bail!("No user message to send");
        }

        let response = self
            .client
            .post(format!("{}/v1/messages", self.api_base))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .context("Anthropic request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("Anthropic API error {}: {}", status, body_text);
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .context("Malformed Anthropic response")?;
        first_text(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::HeaderMap, routing::post, Json, Router};

    fn assistant_config(api_base: String) -> AssistantConfig {
        AssistantConfig {
            provider: "anthropic".to_string(),
            api_base,
            timeout_secs: 5,
            ..Default::default()
        }
    }

    async fn spawn_mock(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_wire_messages_skip_leading_assistant() {
        let history = vec![
            ChatMessage::new(ChatRole::Assistant, "Hi there!"),
            ChatMessage::new(ChatRole::User, "What is memory care?"),
            ChatMessage::new(ChatRole::Assistant, "Memory care is..."),
            ChatMessage::new(ChatRole::User, "How much?"),
        ];
        let wire = wire_messages(&history);
        assert_eq!(wire.len(), 3);
        assert_eq!(wire[0].role, "user");
        assert_eq!(wire[1].role, "assistant");
        assert_eq!(wire[2].content, "How much?");
    }

    #[test]
    fn test_first_text_block() {
        let response: MessagesResponse = serde_json::from_value(serde_json::json!({
            "content": [
                { "type": "tool_use", "id": "x" },
                { "type": "text", "text": "Hello" }
            ]
        }))
        .unwrap();
        assert_eq!(first_text(response).unwrap(), "Hello");

        let empty: MessagesResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(first_text(empty).is_err());
    }

    #[tokio::test]
    async fn test_disabled_model_fails() {
        let model = create_model(&AssistantConfig::default()).unwrap();
        assert_eq!(model.name(), "disabled");
        let history = vec![ChatMessage::new(ChatRole::User, "hello")];
        assert!(model.complete("system", &history).await.is_err());
    }

    #[tokio::test]
    async fn test_anthropic_request_shape() {
        let app = Router::new().route(
            "/v1/messages",
            post(|headers: HeaderMap, Json(body): Json<serde_json::Value>| async move {
                assert_eq!(headers["x-api-key"], "test-key");
                assert_eq!(headers["anthropic-version"], ANTHROPIC_VERSION);
                assert_eq!(body["system"], "be kind");
                assert_eq!(body["max_tokens"], 1024);
                assert_eq!(body["messages"][0]["role"], "user");
                Json(serde_json::json!({
                    "content": [{ "type": "text", "text": "Happy to help." }]
                }))
            }),
        );
        let base = spawn_mock(app).await;
        let model = AnthropicModel::with_api_key(&assistant_config(base), "test-key").unwrap();
        let history = vec![
            ChatMessage::new(ChatRole::Assistant, "Hi there!"),
            ChatMessage::new(ChatRole::User, "Tell me about respite care"),
        ];
        let reply = model.complete("be kind", &history).await.unwrap();
        assert_eq!(reply, "Happy to help.");
    }

    #[tokio::test]
    async fn test_anthropic_error_status_is_an_error() {
        let app = Router::new().route(
            "/v1/messages",
            post(|| async { (axum::http::StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        );
        let base = spawn_mock(app).await;
        let model = AnthropicModel::with_api_key(&assistant_config(base), "k").unwrap();
        let history = vec![ChatMessage::new(ChatRole::User, "hello")];
        let err = model.complete("s", &history).await.unwrap_err();
        assert!(err.to_string().contains("429"));
    }
}
