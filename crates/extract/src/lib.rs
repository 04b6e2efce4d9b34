//! Attachment content extraction for EduMind.
//!
//! [`AttachmentExtractor`] turns one [`Attachment`] into its
//! [`ExtractedContent`]. Extraction never fails: unreadable input degrades
//! to a placeholder or an inline diagnostic so the rest of the send can
//! proceed.
//!
//! Scanned PDFs are a two-step affair. [`AttachmentExtractor::extract`]
//! only classifies them as [`ExtractedContent::Scanned`]; the caller decides
//! on the model first and then calls [`AttachmentExtractor::resolve_scanned`]
//! to rasterize.

pub mod error;
pub mod media;
pub mod pdf;
pub mod text;

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use edumind_config::ExtractionConfig;
use edumind_core::attachment::{Attachment, AttachmentKind, ExtractedContent};
use encoding_rs::Encoding;
use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use tracing::{debug, warn};

pub use error::ExtractError;
pub use pdf::{PdfBackend, PdfClassification, PdfiumBackend, classify_page_texts};
pub use text::UNREADABLE_TEXT_PLACEHOLDER;

/// Converts attachments into extracted content.
pub struct AttachmentExtractor {
    pdf: Arc<dyn PdfBackend>,
    encodings: Vec<&'static Encoding>,
    scan_threshold_chars: usize,
    max_pdf_pages: usize,
    render_dpi: u32,
    jpeg_quality: u8,
}

impl AttachmentExtractor {
    /// Create an extractor using `pdf` for PDF access.
    pub fn new(config: &ExtractionConfig, pdf: Arc<dyn PdfBackend>) -> Self {
        Self {
            pdf,
            encodings: text::resolve_encodings(&config.text_encodings),
            scan_threshold_chars: config.scan_threshold_chars,
            max_pdf_pages: config.max_pdf_pages,
            render_dpi: config.render_dpi,
            jpeg_quality: config.jpeg_quality,
        }
    }

    /// Create an extractor backed by pdfium, as configured.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        let backend = PdfiumBackend::new(config.pdfium_library.clone());
        Self::new(config, Arc::new(backend))
    }

    /// Extract one attachment. Scanned PDFs come back as
    /// [`ExtractedContent::Scanned`] and are not rasterized here.
    pub fn extract(&self, attachment: &Attachment) -> ExtractedContent {
        let content = match attachment.kind() {
            AttachmentKind::Text => {
                let body = text::read_text_file(attachment.path(), &self.encodings);
                ExtractedContent::PlainText(body)
            }
            AttachmentKind::Image => media::read_image_file(attachment.path()),
            AttachmentKind::Pdf => self.detect_pdf(attachment.path()),
        };
        debug!(
            file = %attachment.file_name(),
            kind = content.label(),
            "Extracted attachment"
        );
        content
    }

    /// Classify a PDF as text-bearing or scanned.
    pub fn detect_pdf(&self, path: &Path) -> ExtractedContent {
        match self.pdf.page_texts(path) {
            Ok(pages) => match classify_page_texts(&pages, self.scan_threshold_chars) {
                PdfClassification::Text(text) => ExtractedContent::PdfText(text),
                PdfClassification::Scanned => ExtractedContent::Scanned,
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read PDF");
                ExtractedContent::Unreadable(format!("[PDF read error: {e}]"))
            }
        }
    }

    /// Render the leading pages of a PDF as JPEG buffers.
    ///
    /// Returns an empty list when rendering fails. Never more than the
    /// configured page cap.
    pub fn rasterize_pdf(&self, path: &Path) -> Vec<Vec<u8>> {
        let pages = match self.pdf.render_pages(path, self.max_pdf_pages, self.render_dpi) {
            Ok(pages) => pages,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to render PDF pages");
                return Vec::new();
            }
        };

        let mut jpegs = Vec::with_capacity(pages.len().min(self.max_pdf_pages));
        for (index, page) in pages.iter().take(self.max_pdf_pages).enumerate() {
            match encode_jpeg(page, self.jpeg_quality) {
                Ok(bytes) => jpegs.push(bytes),
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        page = index,
                        error = %e,
                        "Failed to encode page"
                    );
                    return Vec::new();
                }
            }
        }
        debug!(path = %path.display(), pages = jpegs.len(), "Rasterized scanned PDF");
        jpegs
    }

    /// Rasterize `content` if it is [`ExtractedContent::Scanned`]; pass
    /// anything else through unchanged.
    pub fn resolve_scanned(
        &self,
        attachment: &Attachment,
        content: ExtractedContent,
    ) -> ExtractedContent {
        match content {
            ExtractedContent::Scanned => {
                ExtractedContent::PdfPageImages(self.rasterize_pdf(attachment.path()))
            }
            other => other,
        }
    }

    pub fn max_pdf_pages(&self) -> usize {
        self.max_pdf_pages
    }
}

/// JPEG-encode an image, dropping any alpha channel.
fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, ExtractError> {
    let rgb = image.to_rgb8();
    let mut buf = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buf, quality).encode_image(&rgb)?;
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// In-memory PDF backend: fixed page texts, solid-colour pages.
    struct FakePdf {
        texts: Result<Vec<String>, String>,
        page_count: usize,
        render_fails: bool,
        render_calls: Mutex<usize>,
    }

    impl FakePdf {
        fn with_text(pages: &[&str]) -> Self {
            Self {
                texts: Ok(pages.iter().map(|s| s.to_string()).collect()),
                page_count: pages.len(),
                render_fails: false,
                render_calls: Mutex::new(0),
            }
        }

        fn scanned(page_count: usize) -> Self {
            Self {
                texts: Ok(vec![String::new(); page_count]),
                page_count,
                render_fails: false,
                render_calls: Mutex::new(0),
            }
        }

        fn broken() -> Self {
            Self {
                texts: Err("file is not a PDF".into()),
                page_count: 0,
                render_fails: true,
                render_calls: Mutex::new(0),
            }
        }

        fn renders(&self) -> usize {
            *self.render_calls.lock().unwrap()
        }
    }

    impl PdfBackend for FakePdf {
        fn page_texts(&self, _path: &Path) -> Result<Vec<String>, ExtractError> {
            self.texts.clone().map_err(ExtractError::Pdf)
        }

        fn render_pages(
            &self,
            _path: &Path,
            max_pages: usize,
            _dpi: u32,
        ) -> Result<Vec<DynamicImage>, ExtractError> {
            *self.render_calls.lock().unwrap() += 1;
            if self.render_fails {
                return Err(ExtractError::Pdf("render failed".into()));
            }
            let page = RgbaImage::from_pixel(8, 8, Rgba([200, 10, 10, 128]));
            Ok((0..self.page_count.min(max_pages))
                .map(|_| DynamicImage::ImageRgba8(page.clone()))
                .collect())
        }
    }

    fn extractor(pdf: FakePdf) -> (AttachmentExtractor, Arc<FakePdf>) {
        let pdf = Arc::new(pdf);
        let ex = AttachmentExtractor::new(&ExtractionConfig::default(), pdf.clone());
        (ex, pdf)
    }

    fn pdf_attachment() -> Attachment {
        Attachment::from_path(PathBuf::from("/course/chapter.pdf")).unwrap()
    }

    #[test]
    fn text_bearing_pdf_yields_pdf_text() {
        let (ex, _) =
            extractor(FakePdf::with_text(&["Chapter 1: Limits", "Chapter 2: Derivatives"]));
        match ex.extract(&pdf_attachment()) {
            ExtractedContent::PdfText(text) => {
                assert_eq!(text, "Chapter 1: Limits\nChapter 2: Derivatives");
            }
            other => panic!("expected PdfText, got {other:?}"),
        }
    }

    #[test]
    fn short_text_pdf_is_scanned_and_not_rasterized_yet() {
        let (ex, pdf) = extractor(FakePdf::with_text(&["p. 1", ""]));
        assert_eq!(ex.extract(&pdf_attachment()), ExtractedContent::Scanned);
        assert_eq!(pdf.renders(), 0);
    }

    #[test]
    fn unreadable_pdf_becomes_diagnostic() {
        let (ex, _) = extractor(FakePdf::broken());
        match ex.extract(&pdf_attachment()) {
            ExtractedContent::Unreadable(msg) => {
                assert!(msg.starts_with("[PDF read error:"));
                assert!(msg.contains("file is not a PDF"));
            }
            other => panic!("expected Unreadable, got {other:?}"),
        }
    }

    #[test]
    fn rasterization_is_capped_at_three_pages() {
        let (ex, _) = extractor(FakePdf::scanned(10));
        let pages = ex.rasterize_pdf(Path::new("/course/scan.pdf"));
        assert_eq!(pages.len(), 3);
        for jpeg in &pages {
            // JPEG SOI marker
            assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        }
    }

    #[test]
    fn short_documents_render_every_page() {
        let (ex, _) = extractor(FakePdf::scanned(2));
        assert_eq!(ex.rasterize_pdf(Path::new("/course/scan.pdf")).len(), 2);
    }

    #[test]
    fn custom_page_cap_is_honoured() {
        let config = ExtractionConfig {
            max_pdf_pages: 1,
            ..ExtractionConfig::default()
        };
        let ex = AttachmentExtractor::new(&config, Arc::new(FakePdf::scanned(4)));
        assert_eq!(ex.rasterize_pdf(Path::new("/x.pdf")).len(), 1);
    }

    #[test]
    fn render_failure_yields_empty_list() {
        let (ex, _) = extractor(FakePdf::broken());
        assert!(ex.rasterize_pdf(Path::new("/course/scan.pdf")).is_empty());
    }

    #[test]
    fn resolve_scanned_only_touches_scans() {
        let (ex, pdf) = extractor(FakePdf::scanned(5));
        let a = pdf_attachment();

        let text = ExtractedContent::PdfText("already text".into());
        assert_eq!(ex.resolve_scanned(&a, text.clone()), text);
        assert_eq!(pdf.renders(), 0);

        match ex.resolve_scanned(&a, ExtractedContent::Scanned) {
            ExtractedContent::PdfPageImages(pages) => assert_eq!(pages.len(), 3),
            other => panic!("expected page images, got {other:?}"),
        }
        assert_eq!(pdf.renders(), 1);
    }

    #[test]
    fn extracts_text_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.txt");
        std::fs::write(&path, "rule A").unwrap();

        let (ex, _) = extractor(FakePdf::scanned(0));
        let a = Attachment::from_path(&path).unwrap();
        assert_eq!(ex.extract(&a), ExtractedContent::PlainText("rule A".into()));
    }

    #[test]
    fn missing_text_file_yields_placeholder() {
        let (ex, _) = extractor(FakePdf::scanned(0));
        let a = Attachment::from_path("/nonexistent/rules.txt").unwrap();
        assert_eq!(
            ex.extract(&a),
            ExtractedContent::PlainText(UNREADABLE_TEXT_PLACEHOLDER.into())
        );
    }
}
