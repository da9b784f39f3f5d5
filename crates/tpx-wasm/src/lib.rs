//! WASM bindings for techpack field extraction.
//!
//! Text acquisition happens on the JavaScript side (e.g. pdf.js); these
//! bindings take the page text and return the extracted fields.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use tpx_core::models::record::FieldValue;
use tpx_core::{CsvExporter, LabelParser, RecordTable, TechpackParser};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[derive(Serialize)]
struct ExtractOutput {
    fields: Vec<FieldValue>,
    item_name_length: usize,
    missing: Vec<String>,
    processing_time_ms: u64,
}

fn run_extraction(parser: &LabelParser, text: &str) -> ExtractOutput {
    let start = js_sys::Date::now();
    let result = parser.parse(text);
    let name_length =
        tpx_core::item_name_length(result.get(parser.schema().name_field()));

    ExtractOutput {
        fields: result.values,
        item_name_length: name_length,
        missing: result.missing,
        processing_time_ms: (js_sys::Date::now() - start).max(0.0) as u64,
    }
}

/// Extract the techpack fields from page text.
///
/// Returns `{ fields: [{ label, value }], item_name_length, missing, processing_time_ms }`.
#[wasm_bindgen]
pub fn extract_techpack_from_text(text: &str) -> Result<JsValue, JsValue> {
    let parser = LabelParser::techpack().map_err(js_error)?;
    serde_wasm_bindgen::to_value(&run_extraction(&parser, text)).map_err(js_error)
}

/// Extract arbitrary labels from text. Values are returned as written.
#[wasm_bindgen]
pub fn extract_fields(text: &str, labels: Vec<String>) -> Result<JsValue, JsValue> {
    let values = tpx_core::extract(text, labels.as_slice()).map_err(js_error)?;
    serde_wasm_bindgen::to_value(&values).map_err(js_error)
}

/// Normalize a date to DD/MM/YYYY. Not-applicable markers become "".
#[wasm_bindgen]
pub fn normalize_date(raw: &str) -> String {
    tpx_core::normalize_date(raw)
}

/// Character count of an item name.
#[wasm_bindgen]
pub fn item_name_length(name: &str) -> u32 {
    tpx_core::item_name_length(Some(name)) as u32
}

/// Stateful extractor that collects rows for a CSV download.
#[wasm_bindgen]
pub struct TechpackExtractor {
    parser: LabelParser,
    table: RecordTable,
    include_name_length: bool,
}

#[wasm_bindgen]
impl TechpackExtractor {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<TechpackExtractor, JsValue> {
        let parser = LabelParser::techpack().map_err(js_error)?;
        let table = RecordTable::new(parser.schema().clone());
        Ok(Self {
            parser,
            table,
            include_name_length: false,
        })
    }

    /// Toggle date normalization for subsequent extractions.
    #[wasm_bindgen]
    pub fn set_normalize(&mut self, enabled: bool) -> Result<(), JsValue> {
        self.parser = LabelParser::techpack()
            .map_err(js_error)?
            .with_normalization(enabled);
        Ok(())
    }

    /// Append the ITEM NAME LENGTH column to CSV output.
    #[wasm_bindgen]
    pub fn set_include_name_length(&mut self, enabled: bool) {
        self.include_name_length = enabled;
    }

    /// Extract without recording a row.
    #[wasm_bindgen]
    pub fn extract(&self, text: &str) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&run_extraction(&self.parser, text)).map_err(js_error)
    }

    /// Extract and record a row for `source`. Returns the row index.
    #[wasm_bindgen]
    pub fn add(&mut self, source: &str, text: &str) -> usize {
        let record = self.parser.parse(text).into_record(source, self.parser.schema());
        self.table.push(record);
        self.table.len() - 1
    }

    /// Record a row for a document whose text could not be read.
    #[wasm_bindgen]
    pub fn add_failed(&mut self, source: &str, error: &str) -> usize {
        let record =
            tpx_core::TechpackRecord::failed(source, self.parser.schema(), error);
        self.table.push(record);
        self.table.len() - 1
    }

    /// Edit a recorded value. The row's item-name length is recomputed.
    #[wasm_bindgen]
    pub fn set_value(&mut self, row: usize, label: &str, value: &str) -> Result<(), JsValue> {
        self.table.set_value(row, label, value).map_err(js_error)
    }

    /// Recorded rows with file names and lengths.
    #[wasm_bindgen]
    pub fn rows(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.table.records()).map_err(js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn length(&self) -> usize {
        self.table.len()
    }

    #[wasm_bindgen]
    pub fn clear(&mut self) {
        self.table = RecordTable::new(self.parser.schema().clone());
    }

    /// Export recorded rows as UTF-8 CSV bytes with a byte order mark.
    #[wasm_bindgen]
    pub fn to_csv(&self) -> Result<Vec<u8>, JsValue> {
        CsvExporter::new()
            .with_name_length(self.include_name_length)
            .to_bytes(&self.table)
            .map_err(js_error)
    }
}
