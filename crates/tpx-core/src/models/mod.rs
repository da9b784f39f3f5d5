//! Data models: field definitions, records, configuration.

pub mod config;
pub mod fields;
pub mod record;
