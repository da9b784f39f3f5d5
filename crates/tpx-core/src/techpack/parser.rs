//! Label-delimited field parser.
//!
//! Every known label acts as a delimiter for every other label: a value runs
//! from the end of its label to the nearest of
//! - whitespace followed by another known label (as a whole word),
//! - a newline,
//! - the end of the text.

use std::borrow::Cow;
use std::collections::HashMap;
use std::time::Instant;

use regex::Regex;
use tracing::{debug, trace};

use crate::models::config::ExtractionConfig;
use crate::models::fields::{FieldDef, FieldSet, Normalization};
use crate::models::record::{FieldValue, TechpackRecord};

use super::Result;
use super::rules::HORIZONTAL_WHITESPACE;
use crate::error::ExtractionError;

/// Result of parsing one document's text.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// One value per field, in field-set order.
    pub values: Vec<FieldValue>,
    /// Text as received, before whitespace collapsing.
    pub raw_text: String,
    /// Labels that did not occur in the text.
    pub missing: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl ExtractionResult {
    pub fn get(&self, label: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|f| f.label == label)
            .map(|f| f.value.as_str())
    }

    /// Values keyed by label.
    pub fn to_map(&self) -> HashMap<String, String> {
        self.values
            .iter()
            .map(|f| (f.label.clone(), f.value.clone()))
            .collect()
    }

    /// Assemble a record for `source`.
    pub fn into_record(self, source: impl Into<String>, schema: &FieldSet) -> TechpackRecord {
        TechpackRecord::new(
            source,
            schema,
            self.values.into_iter().map(|f| (f.label, f.value)),
        )
    }
}

/// Trait for techpack text parsers.
pub trait TechpackParser {
    /// Parse field values from document text. Missing labels yield empty values.
    fn parse(&self, text: &str) -> ExtractionResult;
}

struct LabelPattern {
    label: String,
    boundary: Regex,
    normalize: Option<Normalization>,
}

/// Parser with boundary patterns compiled once per field set.
pub struct LabelParser {
    schema: FieldSet,
    patterns: Vec<LabelPattern>,
    normalize_values: bool,
    collapse_whitespace: bool,
}

impl LabelParser {
    /// Compile boundary patterns for every field in `schema`.
    pub fn new(schema: FieldSet) -> Result<Self> {
        let patterns = schema
            .fields()
            .iter()
            .map(|field| {
                let source = boundary_pattern(&field.label, schema.fields());
                let boundary = Regex::new(&source).map_err(|e| ExtractionError::Pattern {
                    label: field.label.clone(),
                    reason: e.to_string(),
                })?;
                trace!("Boundary for {:?}: {}", field.label, source);
                Ok(LabelPattern {
                    label: field.label.clone(),
                    boundary,
                    normalize: field.normalize,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!("Compiled {} label patterns", patterns.len());

        Ok(Self {
            schema,
            patterns,
            normalize_values: true,
            collapse_whitespace: true,
        })
    }

    /// Parser for the default techpack labels.
    pub fn techpack() -> Result<Self> {
        Self::new(FieldSet::techpack())
    }

    /// Build a parser from extraction settings.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        Ok(Self::new(config.field_set()?)?
            .with_normalization(config.normalize_values)
            .with_whitespace_collapse(config.collapse_whitespace))
    }

    /// Set value normalization.
    pub fn with_normalization(mut self, enabled: bool) -> Self {
        self.normalize_values = enabled;
        self
    }

    /// Set whitespace collapsing.
    pub fn with_whitespace_collapse(mut self, enabled: bool) -> Self {
        self.collapse_whitespace = enabled;
        self
    }

    pub fn schema(&self) -> &FieldSet {
        &self.schema
    }
}

impl TechpackParser for LabelParser {
    fn parse(&self, text: &str) -> ExtractionResult {
        let start = clock();

        let prepared = if self.collapse_whitespace {
            collapse_horizontal_whitespace(text)
        } else {
            Cow::Borrowed(text)
        };

        let mut values = Vec::with_capacity(self.patterns.len());
        let mut missing = Vec::new();

        for pattern in &self.patterns {
            let value = match find_value(&prepared, &pattern.label, &pattern.boundary) {
                Some(found) => found.to_string(),
                None => {
                    trace!("Label not found: {}", pattern.label);
                    missing.push(pattern.label.clone());
                    String::new()
                }
            };

            let value = match pattern.normalize {
                Some(normalization) if self.normalize_values => normalization.apply(&value),
                _ => value,
            };

            values.push(FieldValue {
                label: pattern.label.clone(),
                value,
            });
        }

        debug!(
            "Extracted {} of {} fields",
            values.len() - missing.len(),
            values.len()
        );

        ExtractionResult {
            values,
            raw_text: text.to_string(),
            missing,
            processing_time_ms: start
                .map(|s| s.elapsed().as_millis() as u64)
                .unwrap_or(0),
        }
    }
}

// `Instant::now` panics on wasm32-unknown-unknown; callers there time the call themselves.
#[cfg(not(target_arch = "wasm32"))]
fn clock() -> Option<Instant> {
    Some(Instant::now())
}

#[cfg(target_arch = "wasm32")]
fn clock() -> Option<Instant> {
    None
}

/// Extract every label's value from `text` without normalization.
pub fn extract<S: AsRef<str>>(text: &str, labels: &[S]) -> Result<HashMap<String, String>> {
    let fields = labels.iter().map(|l| FieldDef::new(l.as_ref())).collect();
    let name_field = labels.first().map(|l| l.as_ref().to_string()).unwrap_or_default();
    let parser = LabelParser::new(FieldSet::new(fields, name_field)?)?.with_normalization(false);
    Ok(parser.parse(text).to_map())
}

/// Collapse runs of spaces and tabs to one space. Newlines are kept.
pub fn collapse_horizontal_whitespace(text: &str) -> Cow<'_, str> {
    HORIZONTAL_WHITESPACE.replace_all(text, " ")
}

/// `\s(?:<other labels, longest first>)\b|\n`
fn boundary_pattern(label: &str, fields: &[FieldDef]) -> String {
    let mut others: Vec<&str> = fields
        .iter()
        .map(|f| f.label.as_str())
        .filter(|other| *other != label)
        .collect();

    if others.is_empty() {
        return r"\n".to_string();
    }

    // Stable: equal lengths keep declaration order
    others.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));

    let alternation = others
        .iter()
        .map(|other| regex::escape(other))
        .collect::<Vec<_>>()
        .join("|");

    format!(r"\s(?:{})\b|\n", alternation)
}

/// Value after the first occurrence of `label`, up to the nearest boundary.
fn find_value<'t>(text: &'t str, label: &str, boundary: &Regex) -> Option<&'t str> {
    let start = text.find(label)? + label.len();
    let end = boundary
        .find_at(text, start)
        .map(|m| m.start())
        .unwrap_or(text.len());
    Some(text[start..end].trim())
}
