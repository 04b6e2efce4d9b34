//! Error types for the EduMind domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// The backend answered, but not with a completion.
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl ProviderError {
    /// True when the request never produced a backend answer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Network(_))
    }

    /// The message shown to the user for this failure, without the
    /// status decoration of `Display`.
    pub fn user_message(&self) -> &str {
        match self {
            Self::ApiError { message, .. } => message,
            Self::Timeout(m) | Self::Network(m) => m,
        }
    }
}

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error(
        "Unsupported attachment type: {} (accepted: .txt, .png, .jpg, .jpeg, .pdf)",
        path.display()
    )]
    Unsupported { path: PathBuf },

    #[error("Attachment not found: {}", path.display())]
    NotFound { path: PathBuf },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("A send is already in flight")]
    Busy,

    #[error("Nothing to send: message is empty and no attachments are pending")]
    EmptyTurn,

    #[error(transparent)]
    Attachment(#[from] AttachmentError),

    /// The blocking extraction task panicked or was cancelled.
    #[error("Attachment extraction did not complete: {0}")]
    Extraction(String),
}
