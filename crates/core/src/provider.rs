//! Provider trait - the abstraction over chat-completion backends.
//!
//! A Provider knows how to send a list of turns to a model and get the
//! assistant's reply text back. Retries, streaming, and auth management are
//! left to the backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ProviderError;
use crate::message::ConversationTurn;

/// Default response budget per reply.
pub const DEFAULT_MAX_TOKENS: u32 = 4000;

/// A chat-completion request, serialized as the backend's request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The model to use (e.g., "deepseek-ai/DeepSeek-V3.2")
    pub model: String,

    /// The conversation turns, oldest first
    pub messages: Vec<ConversationTurn>,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Always false: responses are never streamed
    pub stream: bool,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ConversationTurn>) -> Self {
        Self {
            model: model.into(),
            messages,
            max_tokens: DEFAULT_MAX_TOKENS,
            stream: false,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// The core Provider trait.
///
/// The session calls `complete()` without knowing which backend is in use.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "siliconflow").
    fn name(&self) -> &str;

    /// Send a request and get the assistant's reply text.
    async fn complete(&self, request: ChatRequest) -> std::result::Result<String, ProviderError>;
}
