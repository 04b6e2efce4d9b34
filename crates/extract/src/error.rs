//! Errors raised below the extractor boundary.
//!
//! These never escape [`crate::AttachmentExtractor`]: they are turned into
//! inline diagnostics or an empty page list there.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("PDF backend error: {0}")]
    Pdf(String),

    #[error("Image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}
