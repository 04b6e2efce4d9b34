//! Attachments and the content extracted from them.
//!
//! An [`Attachment`] is classified by file extension when the user adds it
//! and never changes afterwards. Extraction produces one
//! [`ExtractedContent`] per attachment, fresh for every send.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::AttachmentError;

/// What kind of file an attachment is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Text,
    Image,
    Pdf,
}

impl AttachmentKind {
    /// Classify a file extension (case-insensitive, without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "txt" => Some(Self::Text),
            "png" | "jpg" | "jpeg" => Some(Self::Image),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }
}

/// A user-supplied file reference included in a send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    path: PathBuf,
    kind: AttachmentKind,
}

impl Attachment {
    /// Classify `path` by its extension. Does not touch the filesystem.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, AttachmentError> {
        let path = path.into();
        let kind = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(AttachmentKind::from_extension)
            .ok_or_else(|| AttachmentError::Unsupported { path: path.clone() })?;
        Ok(Self { path, kind })
    }

    /// Like [`Attachment::from_path`], but also requires the file to exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AttachmentError> {
        let attachment = Self::from_path(path)?;
        if !attachment.path.is_file() {
            return Err(AttachmentError::NotFound {
                path: attachment.path,
            });
        }
        Ok(attachment)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> AttachmentKind {
        self.kind
    }

    /// The file name used in labels, falling back to the full path.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// The typed result of extracting one attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedContent {
    /// Decoded text file contents.
    PlainText(String),

    /// Raw image payload and the MIME type derived from its extension.
    ImageBytes { bytes: Vec<u8>, mime: String },

    /// Concatenated page text of a text-bearing PDF.
    PdfText(String),

    /// The PDF yielded too little text and must be rasterized.
    Scanned,

    /// Rasterized JPEG pages of a scanned PDF.
    PdfPageImages(Vec<Vec<u8>>),

    /// The attachment could not be read; carries an inline diagnostic.
    Unreadable(String),
}

impl ExtractedContent {
    pub fn is_scanned(&self) -> bool {
        matches!(self, Self::Scanned)
    }

    /// A short classification label for logs and `inspect` output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::PlainText(_) => "text",
            Self::ImageBytes { .. } => "image",
            Self::PdfText(_) => "pdf-text",
            Self::Scanned => "pdf-scanned",
            Self::PdfPageImages(_) => "pdf-pages",
            Self::Unreadable(_) => "unreadable",
        }
    }
}

/// Encode bytes as a base64 `data:` URI.
pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Decode a base64 `data:` URI into its MIME type and bytes.
///
/// Returns `None` for anything that is not a well-formed base64 data URI.
pub fn decode_data_uri(uri: &str) -> Option<(String, Vec<u8>)> {
    let rest = uri.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime = header.strip_suffix(";base64")?;
    let bytes = STANDARD.decode(payload).ok()?;
    Some((mime.to_string(), bytes))
}
