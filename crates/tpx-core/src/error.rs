//! Error types for the tpx-core library.

use thiserror::Error;

/// Main error type for the tpx library.
#[derive(Error, Debug)]
pub enum TpxError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// CSV export or import error.
    #[error("export error: {0}")]
    Export(#[from] ExportError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF text acquisition.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),

    /// The requested page carries no extractable text.
    #[error("page {0} has no text layer")]
    NoTextLayer(u32),
}

/// Errors related to building or editing extracted records.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// A field label is empty or whitespace.
    #[error("field label must not be empty")]
    EmptyLabel,

    /// The same label is declared twice.
    #[error("duplicate field label: {0}")]
    DuplicateLabel(String),

    /// A label is not part of the field set.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// A row index past the end of the table.
    #[error("row {0} is out of range")]
    RowOutOfRange(usize),

    /// The boundary pattern for a label could not be compiled.
    #[error("failed to build pattern for {label}: {reason}")]
    Pattern { label: String, reason: String },
}

/// Errors related to CSV export and review-file import.
#[derive(Error, Debug)]
pub enum ExportError {
    /// CSV encoding or decoding failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Writing the output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A review file is missing a required column.
    #[error("missing column: {0}")]
    MissingColumn(String),

    /// A row refers to a field outside the field set.
    #[error(transparent)]
    Field(#[from] ExtractionError),
}

/// Result type for the tpx library.
pub type Result<T> = std::result::Result<T, TpxError>;

impl TpxError {
    /// Whether the error came from reading a document rather than from setup.
    pub fn is_document_error(&self) -> bool {
        matches!(self, TpxError::Pdf(_) | TpxError::Io(_))
    }
}
