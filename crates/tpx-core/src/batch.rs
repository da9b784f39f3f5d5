//! Sequential batch processing of techpack documents.

use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::{PdfError, Result};
use crate::models::config::{FailurePolicy, TpxConfig};
use crate::models::record::{RecordTable, TechpackRecord};
use crate::pdf::{PdfExtractor, PdfProcessor};
use crate::techpack::{ExtractionResult, LabelParser, TechpackParser};

/// A document that could not be read.
#[derive(Debug, Clone)]
pub struct DocumentFailure {
    pub source: String,
    pub error: String,
}

/// Outcome of a batch run.
#[derive(Debug)]
pub struct BatchReport {
    /// One row per document, failed documents flagged.
    pub table: RecordTable,
    pub failures: Vec<DocumentFailure>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.table.len() - self.failures.len()
    }
}

/// Acquires page text and parses every document in input order.
pub struct BatchProcessor<P: PdfProcessor + Default = PdfExtractor> {
    parser: LabelParser,
    page: u32,
    min_text_length: usize,
    policy: FailurePolicy,
    _pdf: PhantomData<P>,
}

impl<P: PdfProcessor + Default> BatchProcessor<P> {
    /// Create a processor reading page one.
    pub fn new(parser: LabelParser) -> Self {
        Self {
            parser,
            page: 1,
            min_text_length: 1,
            policy: FailurePolicy::default(),
            _pdf: PhantomData,
        }
    }

    /// Build a processor from configuration.
    pub fn from_config(config: &TpxConfig) -> Result<Self> {
        let parser = LabelParser::from_config(&config.extraction)?;
        Ok(Self::new(parser)
            .with_page(config.pdf.page)
            .with_min_text_length(config.pdf.min_text_length)
            .with_policy(config.batch.on_error))
    }

    /// Set the page to read (1-indexed).
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Set the minimum text length for a page to count as a text layer.
    pub fn with_min_text_length(mut self, min_len: usize) -> Self {
        self.min_text_length = min_len;
        self
    }

    /// Set the failure policy.
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn parser(&self) -> &LabelParser {
        &self.parser
    }

    /// Page text of a document held in memory.
    pub fn acquire_text(&self, data: &[u8]) -> std::result::Result<String, PdfError> {
        let mut pdf = P::default();
        pdf.load(data)?;
        pdf.require_page_text(self.page, self.min_text_length)
    }

    /// Parse a document held in memory.
    pub fn process_bytes(&self, data: &[u8]) -> Result<ExtractionResult> {
        let text = self.acquire_text(data)?;
        Ok(self.parser.parse(&text))
    }

    /// Read, parse and assemble the record for one file.
    pub fn process_file(&self, path: &Path) -> Result<TechpackRecord> {
        let data = fs::read(path)?;
        let result = self.process_bytes(&data)?;
        if !result.missing.is_empty() {
            debug!(
                "{}: {} labels not found",
                path.display(),
                result.missing.len()
            );
        }
        Ok(result.into_record(source_name(path), self.parser.schema()))
    }

    /// Process `paths` strictly in order.
    ///
    /// `on_progress(done, total, source)` runs after each document. Under
    /// [`FailurePolicy::Continue`] a document that cannot be read becomes a
    /// flagged empty row; any other error, or any error under
    /// [`FailurePolicy::Abort`], is returned.
    pub fn run<F>(&self, paths: &[PathBuf], mut on_progress: F) -> Result<BatchReport>
    where
        F: FnMut(usize, usize, &str),
    {
        let start = Instant::now();
        let total = paths.len();
        let schema = self.parser.schema();

        let mut table = RecordTable::new(schema.clone());
        let mut failures = Vec::new();

        for (idx, path) in paths.iter().enumerate() {
            let source = source_name(path);

            match self.process_file(path) {
                Ok(record) => table.push(record),
                Err(e) if self.policy == FailurePolicy::Continue && e.is_document_error() => {
                    warn!("Failed to process {}: {}", source, e);
                    let error = e.to_string();
                    table.push(TechpackRecord::failed(&source, schema, &error));
                    failures.push(DocumentFailure {
                        source: source.clone(),
                        error,
                    });
                }
                Err(e) => {
                    warn!("Aborting batch at {}: {}", source, e);
                    return Err(e);
                }
            }

            on_progress(idx + 1, total, &source);
        }

        info!(
            "Processed {} documents ({} failed) in {:?}",
            total,
            failures.len(),
            start.elapsed()
        );

        Ok(BatchReport {
            table,
            failures,
            elapsed: start.elapsed(),
        })
    }
}

/// Source identifier for a path: its file name.
pub fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
