//! Builds the request content for one user turn.
//!
//! Text-only models get a single string with every attachment flattened
//! into labelled blocks. Vision models get a part list: one leading text
//! part that collects the user text and all textual attachments, followed
//! by image parts in attachment order.

use edumind_core::attachment::{Attachment, AttachmentKind, ExtractedContent, encode_data_uri};
use edumind_core::message::{ContentPart, MessageContent};
use edumind_core::model::Capability;
use tracing::warn;

/// An attachment together with the content extracted from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedAttachment {
    pub attachment: Attachment,
    pub content: ExtractedContent,
}

impl PreparedAttachment {
    pub fn new(attachment: Attachment, content: ExtractedContent) -> Self {
        Self { attachment, content }
    }

    fn is_pdf(&self) -> bool {
        self.attachment.kind() == AttachmentKind::Pdf
    }
}

pub struct ContentAssembler {
    language_instruction: String,
}

impl ContentAssembler {
    /// `language` is what vision models are told to answer in.
    pub fn new(language: &str) -> Self {
        Self {
            language_instruction: format!("\n(Please respond in {language})"),
        }
    }

    /// Assemble the content for `capability`. Order of `attachments` is kept.
    pub fn assemble(
        &self,
        user_text: &str,
        capability: Capability,
        attachments: &[PreparedAttachment],
    ) -> MessageContent {
        if attachments.is_empty() {
            return MessageContent::Text(user_text.to_string());
        }

        match capability {
            Capability::Text => MessageContent::Text(assemble_text(user_text, attachments)),
            Capability::Vision => {
                MessageContent::Parts(self.assemble_parts(user_text, attachments))
            }
        }
    }

    fn assemble_parts(
        &self,
        user_text: &str,
        attachments: &[PreparedAttachment],
    ) -> Vec<ContentPart> {
        let mut text = format!("{user_text}{}", self.language_instruction);
        let mut images = Vec::new();

        for prepared in attachments {
            let name = prepared.attachment.file_name();
            match &prepared.content {
                ExtractedContent::ImageBytes { bytes, mime } => {
                    images.push(ContentPart::image(encode_data_uri(mime, bytes)));
                }
                ExtractedContent::PdfText(body) => {
                    text.push_str(&format!("\n\n[PDF content: {name}]\n{body}"));
                }
                ExtractedContent::Unreadable(body) if prepared.is_pdf() => {
                    text.push_str(&format!("\n\n[PDF content: {name}]\n{body}"));
                }
                ExtractedContent::PlainText(body) | ExtractedContent::Unreadable(body) => {
                    text.push_str(&format!("\n\n[file content: {name}]\n{body}"));
                }
                ExtractedContent::PdfPageImages(pages) => {
                    text.push_str(&format!("\n\n[scanned PDF: {name}, {} pages]", pages.len()));
                    images.extend(
                        pages
                            .iter()
                            .map(|page| ContentPart::image(encode_data_uri("image/jpeg", page))),
                    );
                }
                ExtractedContent::Scanned => {
                    warn!(file = %name, "Scanned PDF reached assembly without rasterization");
                    text.push_str(&format!("\n\n[scanned PDF: {name}, 0 pages]"));
                }
            }
        }

        let mut parts = Vec::with_capacity(images.len() + 1);
        parts.push(ContentPart::text(text));
        parts.extend(images);
        parts
    }
}

fn assemble_text(user_text: &str, attachments: &[PreparedAttachment]) -> String {
    let mut out = user_text.to_string();
    for prepared in attachments {
        let name = prepared.attachment.file_name();
        match &prepared.content {
            ExtractedContent::PdfText(body) => {
                out.push_str(&format!("\n[PDF: {name}]\n{body}"));
            }
            ExtractedContent::Unreadable(body) if prepared.is_pdf() => {
                out.push_str(&format!("\n[PDF: {name}]\n{body}"));
            }
            ExtractedContent::PlainText(body) | ExtractedContent::Unreadable(body) => {
                out.push_str(&format!("\n[file: {name}]\n{body}"));
            }
            ExtractedContent::Scanned | ExtractedContent::PdfPageImages(_) => {
                out.push_str(&format!(
                    "\n[scanned PDF: {name} - switch to a vision model to view]"
                ));
            }
            ExtractedContent::ImageBytes { .. } => {
                out.push_str(&format!("\n[image: {name} - switch to a vision model to view]"));
            }
        }
    }
    out
}
