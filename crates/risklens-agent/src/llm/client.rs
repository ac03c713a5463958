//! OpenAI-compatible chat completions client.
//!
//! Talks to the **OpenAI Chat Completions API** (or any compatible endpoint
//! such as Ollama or vLLM) in non-streaming mode only: one request, one
//! complete reply. Each pipeline stage is a full round-trip, so there is
//! nothing to stream.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::{Value, json};

use crate::error::{AgentError, Result};
use crate::llm::ChatModel;
use crate::llm::types::ChatRequest;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default OpenAI API base URL.
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Cap on response length when a request does not set its own.
const DEFAULT_MAX_TOKENS: u32 = 4096;

// ---------------------------------------------------------------------------
// Client configuration
// ---------------------------------------------------------------------------

/// Configuration for connecting to one chat completions endpoint.
#[derive(Debug, Clone)]
pub struct LlmClientConfig {
    /// API key for bearer authentication.
    pub api_key: String,
    /// Base URL for the API (e.g. `https://api.openai.com/v1`).
    pub base_url: String,
    /// Default maximum tokens per response.
    pub max_tokens: u32,
}

impl LlmClientConfig {
    /// Create a configuration for the OpenAI API.
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: OPENAI_BASE_URL.to_owned(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Create a configuration for any OpenAI-compatible API (e.g. Ollama,
    /// Together, vLLM).
    pub fn openai_compatible(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for the Chat Completions API.
///
/// Cheap to clone; clones share the same connection pool and configuration.
#[derive(Debug, Clone)]
pub struct LlmClient {
    config: Arc<LlmClientConfig>,
    http: reqwest::Client,
}

impl LlmClient {
    /// Create a new client with the given configuration.
    pub fn new(config: LlmClientConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(AgentError::MissingApiKey {
                reason: "empty API key".into(),
            });
        }

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(|e| AgentError::RequestFailed {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }

    /// Build the JSON body for the Chat Completions API.
    fn build_request_body(&self, request: &ChatRequest) -> Value {
        let mut body = json!({
            "model": request.model,
            "max_tokens": request.max_tokens.unwrap_or(self.config.max_tokens),
            "messages": request.messages,
        });

        if let Some(temp) = request.temperature {
            body["temperature"] = json!(temp);
        }

        body
    }
}

#[async_trait]
impl ChatModel for LlmClient {
    async fn chat(&self, request: &ChatRequest) -> Result<String> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let body = self.build_request_body(request);

        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", self.config.api_key);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth_value).map_err(|e| AgentError::RequestFailed {
                reason: format!("invalid authorization header: {e}"),
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        tracing::debug!(url = %url, model = %body["model"], "sending chat request");

        let resp = self
            .http
            .post(&url)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::RequestFailed {
                reason: e.to_string(),
            })?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| AgentError::RequestFailed {
            reason: format!("failed to read response body: {e}"),
        })?;

        if !status.is_success() {
            return Err(AgentError::RequestFailed {
                reason: format!("API returned {status}: {text}"),
            });
        }

        let v: Value = serde_json::from_str(&text).map_err(|e| AgentError::MalformedResponse {
            reason: format!("invalid JSON response: {e}"),
        })?;

        parse_chat_response(&v)
    }
}

/// Extract the assistant text from a non-streaming Chat Completions
/// response.
pub fn parse_chat_response(v: &Value) -> Result<String> {
    let message = &v["choices"][0]["message"];

    if message.is_null() {
        return Err(AgentError::MalformedResponse {
            reason: "missing `choices[0].message` in response".into(),
        });
    }

    Ok(message["content"].as_str().unwrap_or_default().to_owned())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::Message;

    #[test]
    fn openai_config_construction() {
        let config = LlmClientConfig::openai("sk-test-key");
        assert_eq!(config.api_key, "sk-test-key");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.max_tokens, 4096);
    }

    #[test]
    fn openai_compatible_config_construction() {
        let config = LlmClientConfig::openai_compatible("local-key", "http://localhost:11434/v1");
        assert_eq!(config.api_key, "local-key");
        assert_eq!(config.base_url, "http://localhost:11434/v1");
    }

    #[test]
    fn empty_api_key_returns_error() {
        assert!(LlmClient::new(LlmClientConfig::openai("")).is_err());
    }

    #[test]
    fn build_request_body_basic() {
        let client = LlmClient::new(LlmClientConfig::openai("sk-test")).unwrap();

        let request = ChatRequest {
            model: "gpt-4.1".into(),
            messages: vec![Message::system("You are helpful."), Message::user("Hello")],
            temperature: Some(0.2),
            max_tokens: Some(2048),
        };

        let body = client.build_request_body(&request);

        assert_eq!(body["model"], "gpt-4.1");
        assert_eq!(body["max_tokens"], 2048);
        let temp = body["temperature"].as_f64().unwrap();
        assert!((temp - 0.2).abs() < 1e-6, "temperature was {temp}");

        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[0]["content"], "You are helpful.");
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[1]["content"], "Hello");
    }

    #[test]
    fn build_request_body_uses_config_max_tokens_by_default() {
        let client = LlmClient::new(LlmClientConfig::openai("sk-test")).unwrap();

        let request = ChatRequest {
            model: "gpt-4o-mini".into(),
            messages: vec![Message::user("Hello")],
            temperature: None,
            max_tokens: None,
        };

        let body = client.build_request_body(&request);
        assert_eq!(body["max_tokens"], 4096);
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn parse_chat_response_text() {
        let response_json: Value = serde_json::json!({
            "id": "chatcmpl-abc",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "[\"filter_data\"]"
                },
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5}
        });

        assert_eq!(
            parse_chat_response(&response_json).unwrap(),
            "[\"filter_data\"]"
        );
    }

    #[test]
    fn parse_chat_response_missing_message() {
        let response_json: Value = serde_json::json!({"choices": []});
        assert!(parse_chat_response(&response_json).is_err());
    }

    #[test]
    fn parse_chat_response_null_content_is_empty() {
        let response_json: Value = serde_json::json!({
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": null},
                "finish_reason": "stop"
            }]
        });
        assert_eq!(parse_chat_response(&response_json).unwrap(), "");
    }
}
