// src/services/gateway.rs
//! OpenAI-compatible chat completions through the AI gateway

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::common::config::GatewayConfig;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("API key not configured")]
    NotConfigured,

    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    response_format: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: u32,
}

/// A single JSON-mode prompt
#[derive(Debug, Clone)]
pub struct JsonPrompt<'a> {
    pub system: &'a str,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

/// Extraction over a long transcript is the slowest call the service makes
pub const GATEWAY_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug)]
pub struct GatewayClient {
    client: Client,
    config: GatewayConfig,
    timeout: Duration,
}

impl GatewayClient {
    pub fn new(client: Client, config: GatewayConfig) -> Self {
        Self {
            client,
            config,
            timeout: GATEWAY_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Sends a JSON-mode chat completion and decodes the reply as `T`
    pub async fn complete_json<T: DeserializeOwned>(
        &self,
        prompt: JsonPrompt<'_>,
    ) -> Result<T, GatewayError> {
        let content = self.complete(prompt).await?;
        parse_json_reply(&content)
    }

    /// Sends a JSON-mode chat completion and returns the raw message content
    pub async fn complete(&self, prompt: JsonPrompt<'_>) -> Result<String, GatewayError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(GatewayError::NotConfigured)?;

        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: prompt.system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.user,
                },
            ],
            temperature: prompt.temperature,
            max_tokens: prompt.max_tokens,
            response_format: serde_json::json!({ "type": "json_object" }),
        };

        debug!(model = %self.config.model, "Sending gateway chat completion");

        let response = self
            .client
            .post(&self.config.url)
            .bearer_auth(api_key)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    warn!(timeout_secs = self.timeout.as_secs_f64(), "Gateway request timed out");
                }
                GatewayError::RequestFailed(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Gateway request failed");
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        if let Some(usage) = &completion.usage {
            info!(
                model = %self.config.model,
                tokens_used = usage.total_tokens,
                "Gateway completion finished"
            );
        }

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| GatewayError::InvalidResponse("No content in response".to_string()))
    }
}

/// Decodes a model reply, tolerating a ```json fence around the object
pub fn parse_json_reply<T: DeserializeOwned>(content: &str) -> Result<T, GatewayError> {
    let trimmed = content.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);

    serde_json::from_str(unfenced.trim())
        .map_err(|e| GatewayError::InvalidResponse(format!("Unparsable JSON reply: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize, Debug)]
    struct Answer {
        known: bool,
    }

    #[test]
    fn test_parse_plain_reply() {
        let answer: Answer = parse_json_reply(r#"{"known": true}"#).unwrap();
        assert!(answer.known);
    }

    #[test]
    fn test_parse_fenced_reply() {
        let answer: Answer = parse_json_reply("```json\n{\"known\": false}\n```").unwrap();
        assert!(!answer.known);
    }

    #[test]
    fn test_parse_garbage_is_invalid_response() {
        let err = parse_json_reply::<Answer>("I am not sure").unwrap_err();
        assert!(matches!(err, GatewayError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_unconfigured_client_refuses() {
        let client = GatewayClient::new(
            Client::new(),
            GatewayConfig {
                url: "http://127.0.0.1:9/".to_string(),
                api_key: None,
                model: "gpt-4o-mini".to_string(),
            },
        );
        assert!(!client.is_configured());

        let err = client
            .complete(JsonPrompt {
                system: "system",
                user: "user".to_string(),
                temperature: 0.1,
                max_tokens: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NotConfigured));
    }

    /// Accepts connections and never answers them
    async fn silent_server() -> std::net::SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        addr
    }

    #[tokio::test]
    async fn test_stalled_gateway_times_out() {
        let addr = silent_server().await;
        let client = GatewayClient::new(
            Client::new(),
            GatewayConfig {
                url: format!("http://{}/v1/chat/completions", addr),
                api_key: Some("sk-test".to_string()),
                model: "gpt-4o-mini".to_string(),
            },
        )
        .with_timeout(Duration::from_millis(200));

        let started = std::time::Instant::now();
        let err = client
            .complete(JsonPrompt {
                system: "system",
                user: "user".to_string(),
                temperature: 0.1,
                max_tokens: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::RequestFailed(_)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
