//! PDF access: the backend seam, the pdfium implementation, and the
//! text-vs-scan heuristic.

use std::path::{Path, PathBuf};

use image::{DynamicImage, RgbaImage};
use pdfium_render::prelude::*;

use crate::error::ExtractError;

/// Page-level PDF operations the extractor needs.
///
/// Implementations block on file I/O and rendering; async callers should
/// run them on a blocking thread.
pub trait PdfBackend: Send + Sync {
    /// Text of every page, in page order.
    fn page_texts(&self, path: &Path) -> Result<Vec<String>, ExtractError>;

    /// Render at most `max_pages` leading pages at `dpi`.
    fn render_pages(
        &self,
        path: &Path,
        max_pages: usize,
        dpi: u32,
    ) -> Result<Vec<DynamicImage>, ExtractError>;
}

/// Outcome of the text-vs-scan check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdfClassification {
    Text(String),
    Scanned,
}

/// Join page texts with newlines, trim, and classify by character count.
pub fn classify_page_texts(pages: &[String], threshold_chars: usize) -> PdfClassification {
    let text = pages.join("\n").trim().to_string();
    if text.chars().count() < threshold_chars {
        PdfClassification::Scanned
    } else {
        PdfClassification::Text(text)
    }
}

/// [`PdfBackend`] backed by the pdfium shared library.
///
/// The library is bound for each call, so a missing pdfium only affects
/// PDF attachments.
#[derive(Debug, Clone, Default)]
pub struct PdfiumBackend {
    library: Option<PathBuf>,
}

impl PdfiumBackend {
    /// Use the library at `library`, or the system library when `None`.
    pub fn new(library: Option<PathBuf>) -> Self {
        Self { library }
    }

    fn bind(&self) -> Result<Pdfium, ExtractError> {
        let bindings = match &self.library {
            Some(path) => Pdfium::bind_to_library(path.as_path()),
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| ExtractError::Pdf(format!("pdfium unavailable: {e}")))?;
        Ok(Pdfium::new(bindings))
    }
}

fn pdf_err(e: PdfiumError) -> ExtractError {
    ExtractError::Pdf(e.to_string())
}

impl PdfBackend for PdfiumBackend {
    fn page_texts(&self, path: &Path) -> Result<Vec<String>, ExtractError> {
        let pdfium = self.bind()?;
        let document = pdfium.load_pdf_from_file(path, None).map_err(pdf_err)?;

        let mut texts = Vec::new();
        for page in document.pages().iter() {
            texts.push(page.text().map_err(pdf_err)?.all());
        }
        Ok(texts)
    }

    fn render_pages(
        &self,
        path: &Path,
        max_pages: usize,
        dpi: u32,
    ) -> Result<Vec<DynamicImage>, ExtractError> {
        let pdfium = self.bind()?;
        let document = pdfium.load_pdf_from_file(path, None).map_err(pdf_err)?;
        // PDF user space is 72 units per inch
        let config = PdfRenderConfig::new().scale_page_by_factor(dpi as f32 / 72.0);

        let mut images = Vec::new();
        for page in document.pages().iter().take(max_pages) {
            let bitmap = page.render_with_config(&config).map_err(pdf_err)?;
            let width = u32::try_from(bitmap.width())
                .map_err(|_| ExtractError::Pdf("negative bitmap width".into()))?;
            let height = u32::try_from(bitmap.height())
                .map_err(|_| ExtractError::Pdf("negative bitmap height".into()))?;
            let rgba = RgbaImage::from_raw(width, height, bitmap.as_rgba_bytes())
                .ok_or_else(|| ExtractError::Pdf("bitmap size mismatch".into()))?;
            images.push(DynamicImage::ImageRgba8(rgba));
        }
        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_at_threshold_is_text() {
        let pages = vec!["12345678901234567890".to_string()];
        assert!(matches!(
            classify_page_texts(&pages, 20),
            PdfClassification::Text(ref t) if t.len() == 20
        ));
    }

    #[test]
    fn text_below_threshold_is_scanned() {
        let pages = vec!["1234567890".to_string(), "123456789".to_string()];
        // "1234567890\n123456789" is exactly 20 characters including the separator
        assert!(matches!(classify_page_texts(&pages, 20), PdfClassification::Text(_)));

        let pages = vec!["123456789".to_string(), "123456789".to_string()];
        assert_eq!(classify_page_texts(&pages, 20), PdfClassification::Scanned);
    }

    #[test]
    fn whitespace_only_is_scanned() {
        let pages = vec!["  \n".to_string(), "\t".to_string(), String::new()];
        assert_eq!(classify_page_texts(&pages, 20), PdfClassification::Scanned);
        assert_eq!(classify_page_texts(&[], 20), PdfClassification::Scanned);
    }

    #[test]
    fn threshold_counts_characters_not_bytes() {
        // 10 CJK characters = 30 bytes, still below a 20-character threshold
        let pages = vec!["一二三四五六七八九十".to_string()];
        assert_eq!(classify_page_texts(&pages, 20), PdfClassification::Scanned);
    }

    #[test]
    fn pdfium_with_bogus_library_path_errors() {
        let backend = PdfiumBackend::new(Some(PathBuf::from("/nonexistent/libpdfium.so")));
        let result = backend.page_texts(Path::new("/nonexistent/doc.pdf"));
        assert!(matches!(result, Err(ExtractError::Pdf(_))));
    }
}
