//! Outbound HTTP client for OpenAI-compatible chat-completions endpoints.
//!
//! The backend's name travels as the model identifier; its generation
//! parameters are forwarded verbatim. Responses with no generated text are
//! failures, never partial successes.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::TransportConfig;
use crate::error::CallError;
use crate::registry::Backend;
use crate::transport::{Completion, GenerationTransport};

/// Chat message in a completion request.
#[derive(Debug, Clone, Serialize)]
struct Message {
    role: String,
    content: String,
}

impl Message {
    fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Chat completion request payload.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f64,
}

/// Chat completion response payload.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

/// API error body (OpenAI-compatible).
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Reqwest-backed generation transport.
pub struct HttpGenerationClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpGenerationClient {
    /// Build a client from transport configuration.
    ///
    /// The bearer credential is read from the environment variable named in
    /// the config; absence means unauthenticated calls (local endpoints).
    pub fn new(config: &TransportConfig) -> Result<Self, reqwest::Error> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        let api_key = std::env::var(&config.api_key_env).ok();
        if api_key.is_none() {
            tracing::warn!(
                env = %config.api_key_env,
                "No bearer credential in environment, calls go out unauthenticated"
            );
        }

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            timeout,
        })
    }
}

#[async_trait]
impl GenerationTransport for HttpGenerationClient {
    async fn generate(&self, backend: &Backend, prompt: &str) -> Result<Completion, CallError> {
        let params = backend.params();
        let request = ChatCompletionRequest {
            model: backend.name().to_string(),
            messages: vec![Message::user(prompt)],
            max_tokens: params.max_output_length,
            temperature: params.sampling_temperature,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                CallError::Timeout(self.timeout)
            } else {
                CallError::Network(e)
            }
        })?;

        let status = response.status();
        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<f64>().ok())
                .filter(|s| s.is_finite() && *s >= 0.0)
                .map(Duration::from_secs_f64);
            return Err(CallError::RateLimited { retry_after });
        }

        if !status.is_success() {
            let code = status.as_u16();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            // A 4xx that is not quota pressure means the backend itself is
            // unusable (model removed, bad credentials, gone).
            return Err(if status.is_client_error() {
                CallError::Unusable {
                    status: code,
                    message,
                }
            } else {
                CallError::Api {
                    status: code,
                    message,
                }
            });
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| CallError::Parse(e.to_string()))?;

        let model = body.model;
        let text = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();
        if text.is_empty() {
            return Err(CallError::EmptyCompletion);
        }

        Ok(Completion { text, model })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_payload_shape() {
        let request = ChatCompletionRequest {
            model: "backend-a".to_string(),
            messages: vec![Message::user("hello")],
            max_tokens: 256,
            temperature: 0.7,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "backend-a");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hello");
        assert_eq!(json["max_tokens"], 256);
    }

    #[test]
    fn error_body_message_is_extracted() {
        let body = r#"{"error": {"message": "model `x` was removed"}}"#;
        let parsed: ApiErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.error.message, "model `x` was removed");
    }
}
