//! Core library for techpack field extraction.
//!
//! This crate provides:
//! - PDF text acquisition (first page text layer)
//! - Label-delimited field extraction over a fixed label vocabulary
//! - Date normalization for date-like fields
//! - Record tables with the derived item-name length
//! - CSV export and the editable review file

pub mod error;
pub mod export;
pub mod models;
pub mod techpack;

#[cfg(feature = "native")]
pub mod batch;
#[cfg(feature = "native")]
pub mod pdf;

pub use error::{ExportError, ExtractionError, PdfError, Result, TpxError};
pub use export::{CsvExporter, read_review};
pub use models::config::{FailurePolicy, TpxConfig};
pub use models::fields::{FieldDef, FieldSet, Normalization};
pub use models::record::{FieldValue, RecordTable, TechpackRecord, item_name_length};
pub use techpack::rules::normalize_date;
pub use techpack::{ExtractionResult, LabelParser, TechpackParser, extract};

#[cfg(feature = "native")]
pub use batch::{BatchProcessor, BatchReport, DocumentFailure};
#[cfg(feature = "native")]
pub use pdf::{PdfExtractor, PdfProcessor};
