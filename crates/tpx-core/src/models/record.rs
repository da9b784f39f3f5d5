//! Extracted techpack records and the record table.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::fields::FieldSet;
use crate::error::ExtractionError;

/// Column holding the source file name.
pub const FILE_COLUMN: &str = "FILE";

/// Column holding the derived item-name length.
pub const NAME_LENGTH_COLUMN: &str = "ITEM NAME LENGTH";

/// Number of characters in an item name, 0 when absent.
pub fn item_name_length(value: Option<&str>) -> usize {
    value.map(|v| v.chars().count()).unwrap_or(0)
}

/// A label and its current value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValue {
    pub label: String,
    pub value: String,
}

/// One processed document.
///
/// Serialize-only: the length is derived, so records are rebuilt from values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TechpackRecord {
    /// Originating file name.
    pub source: String,

    /// One entry per field, in field-set order.
    fields: Vec<FieldValue>,

    /// Label the length metric is computed from.
    name_field: String,

    /// Derived length of the item-name value.
    name_length: usize,

    /// Acquisition failure, when the document could not be read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TechpackRecord {
    /// Build a record with an entry for every field in `schema`.
    ///
    /// Values for labels outside the set are dropped; missing labels become empty.
    pub fn new<I, K, V>(source: impl Into<String>, schema: &FieldSet, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut provided: HashMap<String, String> = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let fields = schema
            .labels()
            .map(|label| FieldValue {
                label: label.to_string(),
                value: provided.remove(label).unwrap_or_default(),
            })
            .collect();

        let mut record = Self {
            source: source.into(),
            fields,
            name_field: schema.name_field().to_string(),
            name_length: 0,
            error: None,
        };
        record.refresh_name_length();
        record
    }

    /// An all-empty record flagged with the acquisition error.
    pub fn failed(source: impl Into<String>, schema: &FieldSet, error: impl Into<String>) -> Self {
        let mut record = Self::new(source, schema, std::iter::empty::<(String, String)>());
        record.error = Some(error.into());
        record
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .map(|f| f.value.as_str())
    }

    /// Replace a field value and recompute the derived length.
    pub fn set(&mut self, label: &str, value: impl Into<String>) -> Result<(), ExtractionError> {
        let field = self
            .fields
            .iter_mut()
            .find(|f| f.label == label)
            .ok_or_else(|| ExtractionError::UnknownField(label.to_string()))?;
        field.value = value.into();
        self.refresh_name_length();
        Ok(())
    }

    pub fn fields(&self) -> &[FieldValue] {
        &self.fields
    }

    /// Values in field-set order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.value.as_str())
    }

    pub fn name_length(&self) -> usize {
        self.name_length
    }

    /// Recompute the item-name length from the current value.
    pub fn refresh_name_length(&mut self) -> usize {
        self.name_length = item_name_length(self.get(&self.name_field));
        self.name_length
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Ordered records sharing one field set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecordTable {
    schema: FieldSet,
    records: Vec<TechpackRecord>,
}

impl RecordTable {
    pub fn new(schema: FieldSet) -> Self {
        Self {
            schema,
            records: Vec::new(),
        }
    }

    pub fn schema(&self) -> &FieldSet {
        &self.schema
    }

    pub fn push(&mut self, record: TechpackRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[TechpackRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &TechpackRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Edit one cell. The row's derived length is recomputed.
    pub fn set_value(
        &mut self,
        row: usize,
        label: &str,
        value: impl Into<String>,
    ) -> Result<(), ExtractionError> {
        let record = self
            .records
            .get_mut(row)
            .ok_or(ExtractionError::RowOutOfRange(row))?;
        record.set(label, value)
    }

    /// Full column order: file, every label, derived length.
    pub fn columns(&self) -> Vec<&str> {
        std::iter::once(FILE_COLUMN)
            .chain(self.schema.labels())
            .chain(std::iter::once(NAME_LENGTH_COLUMN))
            .collect()
    }

    /// Records whose item name is longer than `limit` characters.
    pub fn over_name_limit(&self, limit: usize) -> impl Iterator<Item = &TechpackRecord> {
        self.records.iter().filter(move |r| r.name_length() > limit)
    }

    pub fn failed(&self) -> impl Iterator<Item = &TechpackRecord> {
        self.records.iter().filter(|r| r.is_failed())
    }
}
