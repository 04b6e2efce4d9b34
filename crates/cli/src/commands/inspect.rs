//! `edumind inspect` - Show how a file would be extracted.

use std::path::PathBuf;

use edumind_config::AppConfig;
use edumind_core::attachment::{Attachment, ExtractedContent};
use edumind_extract::AttachmentExtractor;

const PREVIEW_CHARS: usize = 200;

pub async fn run(file: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let attachment = Attachment::open(file)?;
    let extractor = AttachmentExtractor::from_config(&config.extraction);

    let content = extractor.extract(&attachment);

    println!("  File:   {}", attachment.file_name());
    println!("  Result: {}", content.label());

    match &content {
        ExtractedContent::PlainText(text) | ExtractedContent::PdfText(text) => {
            println!("  Chars:  {}", text.chars().count());
            println!();
            println!("{}", preview(text));
        }
        ExtractedContent::ImageBytes { bytes, mime } => {
            println!("  MIME:   {mime}");
            println!("  Bytes:  {}", bytes.len());
        }
        ExtractedContent::Scanned => {
            println!(
                "  Less than {} characters of text; a vision model will be used.",
                config.extraction.scan_threshold_chars
            );
            let pages = extractor.resolve_scanned(&attachment, content.clone());
            if let ExtractedContent::PdfPageImages(pages) = pages {
                println!(
                    "  Pages:  {} rendered (cap {})",
                    pages.len(),
                    extractor.max_pdf_pages()
                );
                for (i, page) in pages.iter().enumerate() {
                    println!("    page {}: {} bytes JPEG", i + 1, page.len());
                }
            }
        }
        ExtractedContent::PdfPageImages(pages) => {
            println!("  Pages:  {}", pages.len());
        }
        ExtractedContent::Unreadable(diagnostic) => {
            println!("  {diagnostic}");
        }
    }

    Ok(())
}

fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().count() > PREVIEW_CHARS {
        out.push_str("...");
    }
    out
}
