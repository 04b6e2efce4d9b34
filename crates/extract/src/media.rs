//! Image attachments: raw bytes plus a MIME type from the extension.

use std::path::Path;

use edumind_core::attachment::ExtractedContent;

/// MIME type for an image path, derived from its extension only.
pub fn image_mime(path: &Path) -> String {
    mime_guess::from_path(path)
        .first()
        .filter(|m| m.type_() == mime_guess::mime::IMAGE)
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string())
}

/// Read an image file as-is. The bytes are never decoded or resampled.
pub fn read_image_file(path: &Path) -> ExtractedContent {
    match std::fs::read(path) {
        Ok(bytes) => ExtractedContent::ImageBytes {
            bytes,
            mime: image_mime(path),
        },
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read image attachment");
            ExtractedContent::Unreadable(format!("[image read error: {e}]"))
        }
    }
}
