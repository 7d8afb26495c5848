//! OpenAI-compatible chat-completions responder.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::ResponderConfig;
use crate::error::{ResponderError, Result};

use super::Responder;

const SYSTEM_PROMPT: &str = "You are a smart, friendly assistant that books \
appointments on the user's calendar and lists their appointments whenever \
they ask. Understand natural language like \"tomorrow afternoon\" or \"next \
Friday\". Respond intelligently to general questions, be polite and \
helpful, and guide the user toward scheduling if possible.";

/// Chat-completions client for an OpenAI-compatible API (Groq by default).
pub struct GroqResponder {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

/// Chat completion request format.
#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Chat completion response format.
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// API error response format.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl GroqResponder {
    /// Create a responder from configuration. The API key may come from
    /// the config or the SAHAYAK_API_KEY environment variable.
    pub fn from_config(config: &ResponderConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("SAHAYAK_API_KEY").ok())
            .ok_or_else(|| {
                ResponderError::Api(
                    "API key not provided and SAHAYAK_API_KEY env var not set".to_string(),
                )
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ResponderError::Api(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl Responder for GroqResponder {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = CompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ResponderError::Api("Request timed out".to_string())
                } else if e.is_connect() {
                    ResponderError::Api(format!("Connection failed: {}", e))
                } else {
                    ResponderError::Api(format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();

        if status.is_success() {
            let result: CompletionResponse = response
                .json()
                .await
                .map_err(|e| ResponderError::Api(format!("Failed to parse response: {}", e)))?;

            let reply = result
                .choices
                .into_iter()
                .next()
                .map(|c| c.message.content)
                .unwrap_or_default();
            if reply.is_empty() {
                return Err(ResponderError::EmptyCompletion.into());
            }
            Ok(reply)
        } else if status.as_u16() == 429 {
            Err(ResponderError::RateLimited.into())
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_text) {
                Err(ResponderError::Api(format!(
                    "API error ({}): {}",
                    status, error_response.error.message
                ))
                .into())
            } else {
                Err(ResponderError::Api(format!("API error ({}): {}", status, error_text)).into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_api_key() {
        let config = ResponderConfig {
            api_key: None,
            ..Default::default()
        };
        // Only valid when the env var is absent; skip otherwise.
        if std::env::var("SAHAYAK_API_KEY").is_err() {
            assert!(GroqResponder::from_config(&config).is_err());
        }
    }

    #[test]
    fn test_request_serialization() {
        let request = CompletionRequest {
            model: "llama3-70b-8192",
            messages: vec![ChatMessage {
                role: "user",
                content: "hello",
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama3-70b-8192");
        assert_eq!(json["messages"][0]["role"], "user");
    }
}
