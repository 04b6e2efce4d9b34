//! OpenAI-compatible provider implementation.
//!
//! Works with SiliconFlow, OpenAI, OpenRouter, vLLM, Ollama, and any
//! endpoint exposing `/v1/chat/completions`. Requests are never streamed.
//!
//! Response handling:
//! - `{"choices":[{"message":{"content":...}}]}` → the reply text
//! - any body carrying a string `message` field → backend error with it
//! - anything else → backend error carrying the raw body

use std::time::Duration;

use async_trait::async_trait;
use edumind_core::error::ProviderError;
use edumind_core::provider::{ChatRequest, Provider};
use serde::Deserialize;
use tracing::{debug, warn};

/// Default HTTP timeout for one completion request.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// An OpenAI-compatible chat-completion backend.
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a new OpenAI-compatible provider.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: build_client(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        }
    }

    /// Replace the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "Falling back to default HTTP client");
            reqwest::Client::new()
        })
}

fn transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(e.to_string())
    } else {
        ProviderError::Network(e.to_string())
    }
}

/// Interpret a completion response body, whatever its HTTP status.
fn parse_completion(status: u16, body: &str) -> Result<String, ProviderError> {
    match serde_json::from_str::<ApiBody>(body) {
        Ok(ApiBody::Completion { choices }) => choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::ApiError {
                status_code: status,
                message: body.to_string(),
            }),
        Ok(ApiBody::Error { message }) => Err(ProviderError::ApiError {
            status_code: status,
            message,
        }),
        Err(_) => Err(ProviderError::ApiError {
            status_code: status,
            message: if body.trim().is_empty() {
                format!("empty response (HTTP {status})")
            } else {
                body.to_string()
            },
        }),
    }
}

#[async_trait]
impl Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: ChatRequest) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);

        debug!(
            provider = %self.name,
            model = %request.model,
            messages = request.messages.len(),
            "Sending completion request"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_error)?;

        let result = parse_completion(status, &body);
        if let Err(ref e) = result {
            warn!(provider = %self.name, status, error = %e, "Provider returned error");
        }
        result
    }
}

// --- Chat-completion API types (internal) ---

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiBody {
    Completion { choices: Vec<ApiChoice> },
    Error { message: String },
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    content: Option<String>,
}
