//! Digital text-layer extraction for poster PDFs.

use super::types::TextSource;
use super::ExtractionError;

/// Text source backed by the pdf-extract crate. Posters are single-page in
/// practice, but multi-page documents are joined in page order.
pub struct PdfTextSource;

impl TextSource for PdfTextSource {
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<String, ExtractionError> {
        let pages = pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
            .map_err(|e| ExtractionError::PdfParsing(e.to_string()))?;
        Ok(pages.join("\n"))
    }
}

/// Mock text source for tests. Returns a fixed text for any input.
pub struct MockTextSource {
    text: String,
}

impl MockTextSource {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

impl TextSource for MockTextSource {
    fn extract_text(&self, _pdf_bytes: &[u8]) -> Result<String, ExtractionError> {
        Ok(self.text.clone())
    }
}

/// Always-failing text source, for fallback tests.
pub struct FailingTextSource;

impl TextSource for FailingTextSource {
    fn extract_text(&self, _pdf_bytes: &[u8]) -> Result<String, ExtractionError> {
        Err(ExtractionError::PdfParsing(
            "mock text extraction failure".into(),
        ))
    }
}
