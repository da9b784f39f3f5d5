//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};

use super::fields::{FieldDef, FieldSet, ITEM_NAME, techpack_fields};
use crate::error::{ExtractionError, TpxError};

/// Main configuration for the tpx pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TpxConfig {
    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// CSV export configuration.
    pub export: ExportConfig,

    /// Batch processing configuration.
    pub batch: BatchConfig,
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Page to read fields from (1-indexed).
    pub page: u32,

    /// Minimum number of non-whitespace characters for a page to count as text.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            page: 1,
            min_text_length: 1,
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Known fields, in column order.
    pub fields: Vec<FieldDef>,

    /// Field whose value length is tracked.
    pub name_field: String,

    /// Apply per-field normalization (dates).
    pub normalize_values: bool,

    /// Collapse runs of spaces and tabs before matching.
    pub collapse_whitespace: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            fields: techpack_fields(),
            name_field: ITEM_NAME.to_string(),
            normalize_values: true,
            collapse_whitespace: true,
        }
    }
}

impl ExtractionConfig {
    /// Validate the configured fields into a field set.
    pub fn field_set(&self) -> Result<FieldSet, ExtractionError> {
        FieldSet::new(self.fields.clone(), self.name_field.clone())
    }
}

/// CSV export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Default output file name.
    pub file_name: String,

    /// Prefix the output with a UTF-8 byte-order mark.
    pub byte_order_mark: bool,

    /// Append the item-name length column.
    pub include_name_length: bool,

    /// Write empty rows for documents that failed to load.
    pub include_failed_rows: bool,

    /// Item names longer than this are highlighted.
    pub name_length_threshold: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: "techpacks.csv".to_string(),
            byte_order_mark: true,
            include_name_length: false,
            include_failed_rows: false,
            name_length_threshold: 23,
        }
    }
}

/// What to do when a document cannot be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Record a flagged row and keep processing.
    #[default]
    Continue,
    /// Stop the batch at the first failure.
    Abort,
}

/// Batch processing configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub on_error: FailurePolicy,
}

impl TpxConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, TpxError> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| TpxError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), TpxError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| TpxError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fields::Normalization;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: TpxConfig =
            serde_json::from_str(r#"{"export": {"include_name_length": true}}"#).unwrap();
        assert!(config.export.include_name_length);
        assert_eq!(config.export.file_name, "techpacks.csv");
        assert_eq!(config.extraction.fields.len(), 17);
        assert_eq!(config.batch.on_error, FailurePolicy::Continue);
        assert_eq!(config.pdf.page, 1);
    }

    #[test]
    fn test_custom_fields() {
        let json = r#"{"extraction": {
            "fields": [{"label": "NAME"}, {"label": "DUE", "normalize": "date"}],
            "name_field": "NAME"
        }}"#;
        let config: TpxConfig = serde_json::from_str(json).unwrap();
        let set = config.extraction.field_set().unwrap();
        assert_eq!(set.labels().collect::<Vec<_>>(), vec!["NAME", "DUE"]);
        assert_eq!(set.fields()[1].normalize, Some(Normalization::Date));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = TpxConfig::default();
        config.batch.on_error = FailurePolicy::Abort;
        config.save(&path).unwrap();

        let loaded = TpxConfig::from_file(&path).unwrap();
        assert_eq!(loaded.batch.on_error, FailurePolicy::Abort);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"batch": {"on_error": "retry"}}"#).unwrap();

        let err = TpxConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, TpxError::Config(_)));
    }
}
