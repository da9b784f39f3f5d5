//! Field definitions for techpack documents.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;
use crate::techpack::rules::normalize_date;

/// Label of the item-name field that drives the length metric.
pub const ITEM_NAME: &str = "ITEM NAME";

/// Label of the only date-like field in the default set.
pub const DATE: &str = "DATE";

/// Default techpack labels in column order.
pub const TECHPACK_LABELS: [&str; 17] = [
    "COLLECTION NUMBER",
    ITEM_NAME,
    "CATEGORY",
    "SILHOUETTE",
    "GENDER",
    "STYLE NUMBER",
    "WEBSITE NAME",
    "SUB CATEGORY",
    "SIZE RANGE",
    DATE,
    "FABRIC TOP",
    "DESIGNER",
    "COLOR COMBO",
    "PRINT NAME",
    "FABRIC BOTTOM",
    "FABRIC FULL GARMENT",
    "PRINT TECHNIQUE",
];

/// Value normalization applied after extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Reformat dates as `DD/MM/YYYY`.
    Date,
}

impl Normalization {
    /// Apply the normalization. Never fails; unparseable input is returned trimmed.
    pub fn apply(self, raw: &str) -> String {
        match self {
            Normalization::Date => normalize_date(raw),
        }
    }
}

/// A single known field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Label text as it appears in the document (case-sensitive).
    pub label: String,

    /// Normalization to apply to the extracted value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalize: Option<Normalization>,
}

impl FieldDef {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            normalize: None,
        }
    }

    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalize = Some(normalization);
        self
    }
}

/// Default field definitions: the techpack labels with `DATE` normalized.
pub fn techpack_fields() -> Vec<FieldDef> {
    TECHPACK_LABELS
        .iter()
        .map(|&label| {
            let field = FieldDef::new(label);
            if label == DATE {
                field.with_normalization(Normalization::Date)
            } else {
                field
            }
        })
        .collect()
}

/// Validated, ordered collection of fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSet {
    fields: Vec<FieldDef>,
    name_field: String,
}

impl FieldSet {
    /// Build a field set, rejecting empty or duplicate labels.
    pub fn new(
        fields: Vec<FieldDef>,
        name_field: impl Into<String>,
    ) -> Result<Self, ExtractionError> {
        let mut seen = HashSet::new();
        for field in &fields {
            if field.label.trim().is_empty() {
                return Err(ExtractionError::EmptyLabel);
            }
            if !seen.insert(field.label.as_str()) {
                return Err(ExtractionError::DuplicateLabel(field.label.clone()));
            }
        }

        Ok(Self {
            fields,
            name_field: name_field.into(),
        })
    }

    /// The default techpack field set.
    pub fn techpack() -> Self {
        Self {
            fields: techpack_fields(),
            name_field: ITEM_NAME.to_string(),
        }
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Column index of a label.
    pub fn position(&self, label: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.label == label)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.position(label).is_some()
    }

    /// Label whose value length is tracked.
    pub fn name_field(&self) -> &str {
        &self.name_field
    }
}

impl Default for FieldSet {
    fn default() -> Self {
        Self::techpack()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_techpack_set_order() {
        let set = FieldSet::techpack();
        assert_eq!(set.len(), 17);
        assert_eq!(set.labels().next(), Some("COLLECTION NUMBER"));
        assert_eq!(set.position("PRINT TECHNIQUE"), Some(16));
        assert_eq!(set.name_field(), ITEM_NAME);
    }

    #[test]
    fn test_only_date_is_normalized() {
        let normalized: Vec<_> = FieldSet::techpack()
            .fields()
            .iter()
            .filter(|f| f.normalize.is_some())
            .map(|f| f.label.clone())
            .collect();
        assert_eq!(normalized, vec![DATE.to_string()]);
    }

    #[test]
    fn test_rejects_duplicate_and_empty_labels() {
        let dup = FieldSet::new(vec![FieldDef::new("A"), FieldDef::new("A")], "A");
        assert!(matches!(dup, Err(ExtractionError::DuplicateLabel(l)) if l == "A"));

        let empty = FieldSet::new(vec![FieldDef::new("  ")], "A");
        assert!(matches!(empty, Err(ExtractionError::EmptyLabel)));
    }

    #[test]
    fn test_field_def_serde() {
        let json = r#"{"label":"DATE","normalize":"date"}"#;
        let field: FieldDef = serde_json::from_str(json).unwrap();
        assert_eq!(field, FieldDef::new("DATE").with_normalization(Normalization::Date));

        let plain: FieldDef = serde_json::from_str(r#"{"label":"GENDER"}"#).unwrap();
        assert_eq!(plain.normalize, None);
    }
}
