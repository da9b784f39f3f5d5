//! PDF text acquisition module.

mod extractor;
#[cfg(test)]
pub(crate) mod fixtures;

pub use extractor::PdfExtractor;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF text sources.
///
/// The batch pipeline is generic over this trait so that the document
/// backend can be swapped (or faked in tests).
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract text from a specific page (1-indexed).
    fn extract_page_text(&self, page: u32) -> Result<String>;

    /// Extract text from a page, failing when the page has no text layer.
    fn require_page_text(&self, page: u32, min_len: usize) -> Result<String> {
        let text = self.extract_page_text(page)?;
        if text.trim().chars().count() < min_len.max(1) {
            return Err(PdfError::NoTextLayer(page));
        }
        Ok(text)
    }
}
