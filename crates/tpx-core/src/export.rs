//! CSV export of record tables, and the editable review file.
//!
//! The final export has one column per field label. The review file adds the
//! source `FILE` column and the derived `ITEM NAME LENGTH` so a person can
//! correct values in a spreadsheet; re-importing it recomputes the length.

use std::io::{Read, Write};

use tracing::debug;

use crate::error::ExportError;
use crate::models::config::ExportConfig;
use crate::models::fields::FieldSet;
use crate::models::record::{FILE_COLUMN, NAME_LENGTH_COLUMN, RecordTable, TechpackRecord};

/// UTF-8 byte-order mark, for spreadsheet tools that sniff encodings.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Writes record tables as CSV.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    byte_order_mark: bool,
    include_name_length: bool,
    include_failed_rows: bool,
}

impl CsvExporter {
    pub fn new() -> Self {
        Self {
            byte_order_mark: true,
            include_name_length: false,
            include_failed_rows: false,
        }
    }

    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            byte_order_mark: config.byte_order_mark,
            include_name_length: config.include_name_length,
            include_failed_rows: config.include_failed_rows,
        }
    }

    pub fn with_byte_order_mark(mut self, enabled: bool) -> Self {
        self.byte_order_mark = enabled;
        self
    }

    pub fn with_name_length(mut self, enabled: bool) -> Self {
        self.include_name_length = enabled;
        self
    }

    pub fn with_failed_rows(mut self, enabled: bool) -> Self {
        self.include_failed_rows = enabled;
        self
    }

    fn rows<'a>(&self, table: &'a RecordTable) -> impl Iterator<Item = &'a TechpackRecord> {
        let include_failed = self.include_failed_rows;
        table.iter().filter(move |r| include_failed || !r.is_failed())
    }

    /// Write the final export: field labels only, no source column.
    pub fn write<W: Write>(&self, table: &RecordTable, mut out: W) -> Result<()> {
        if self.byte_order_mark {
            out.write_all(UTF8_BOM)?;
        }

        let mut wtr = csv::Writer::from_writer(out);

        let mut header: Vec<&str> = table.schema().labels().collect();
        if self.include_name_length {
            header.push(NAME_LENGTH_COLUMN);
        }
        wtr.write_record(&header)?;

        let mut written = 0;
        for record in self.rows(table) {
            let mut row: Vec<String> = record.values().map(str::to_string).collect();
            if self.include_name_length {
                row.push(record.name_length().to_string());
            }
            wtr.write_record(&row)?;
            written += 1;
        }

        wtr.flush()?;
        debug!("Exported {} rows", written);
        Ok(())
    }

    /// Write the review file: `FILE`, every label, `ITEM NAME LENGTH`.
    pub fn write_review<W: Write>(&self, table: &RecordTable, mut out: W) -> Result<()> {
        if self.byte_order_mark {
            out.write_all(UTF8_BOM)?;
        }

        let mut wtr = csv::Writer::from_writer(out);
        wtr.write_record(table.columns())?;

        for record in self.rows(table) {
            let row: Vec<String> = std::iter::once(record.source.clone())
                .chain(record.values().map(str::to_string))
                .chain(std::iter::once(record.name_length().to_string()))
                .collect();
            wtr.write_record(&row)?;
        }

        wtr.flush()?;
        Ok(())
    }

    /// Render the final export in memory.
    pub fn to_bytes(&self, table: &RecordTable) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write(table, &mut buf)?;
        Ok(buf)
    }

    /// Export to `path`. Nothing is left at `path` if any step fails.
    #[cfg(feature = "native")]
    pub fn export_to_path(&self, table: &RecordTable, path: &std::path::Path) -> Result<()> {
        write_atomically(path, &self.to_bytes(table)?)
    }

    /// Write the review file to `path`.
    #[cfg(feature = "native")]
    pub fn review_to_path(&self, table: &RecordTable, path: &std::path::Path) -> Result<()> {
        let mut buf = Vec::new();
        self.write_review(table, &mut buf)?;
        write_atomically(path, &buf)
    }
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Read an edited review file back into a table.
///
/// Every label in `schema` must have a column; `FILE` is optional and extra
/// columns (including a stale `ITEM NAME LENGTH`) are ignored.
pub fn read_review<R: Read>(mut input: R, schema: &FieldSet) -> Result<RecordTable> {
    let mut content = String::new();
    input.read_to_string(&mut content)?;
    let content = content.trim_start_matches('\u{feff}');

    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = rdr.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h.trim() == name);

    let file_idx = column(FILE_COLUMN);
    let label_idx = schema
        .labels()
        .map(|label| {
            column(label)
                .map(|idx| (label, idx))
                .ok_or_else(|| ExportError::MissingColumn(label.to_string()))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut table = RecordTable::new(schema.clone());
    for (row_num, row) in rdr.records().enumerate() {
        let row = row?;
        let source = file_idx
            .and_then(|idx| row.get(idx))
            .map(str::to_string)
            .unwrap_or_else(|| format!("row {}", row_num + 1));

        let values = label_idx
            .iter()
            .map(|&(label, idx)| (label, row.get(idx).unwrap_or("")));

        table.push(TechpackRecord::new(source, schema, values));
    }

    debug!("Read {} rows from review file", table.len());
    Ok(table)
}

#[cfg(feature = "native")]
fn write_atomically(path: &std::path::Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => std::path::Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| ExportError::Io(e.error))?;

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fields::{FieldDef, ITEM_NAME};
    use pretty_assertions::assert_eq;

    fn schema() -> FieldSet {
        FieldSet::new(
            vec![
                FieldDef::new("COLLECTION NUMBER"),
                FieldDef::new(ITEM_NAME),
                FieldDef::new("COLOR COMBO"),
            ],
            ITEM_NAME,
        )
        .unwrap()
    }

    fn table() -> RecordTable {
        let schema = schema();
        let mut table = RecordTable::new(schema.clone());
        table.push(TechpackRecord::new(
            "a.pdf",
            &schema,
            [("COLLECTION NUMBER", "SS24"), (ITEM_NAME, "Wrap Dress"), ("COLOR COMBO", "Navy, White")],
        ));
        table.push(TechpackRecord::new("b.pdf", &schema, [(ITEM_NAME, "Tee")]));
        table.push(TechpackRecord::failed("c.pdf", &schema, "PDF has no pages"));
        table
    }

    #[test]
    fn test_export_layout() {
        let bytes = CsvExporter::new().to_bytes(&table()).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));

        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        assert_eq!(
            text,
            "COLLECTION NUMBER,ITEM NAME,COLOR COMBO\n\
             SS24,Wrap Dress,\"Navy, White\"\n\
             ,Tee,\n"
        );
    }

    #[test]
    fn test_empty_field_is_present_cell() {
        let bytes = CsvExporter::new()
            .with_byte_order_mark(false)
            .to_bytes(&table())
            .unwrap();
        let mut rdr = csv::Reader::from_reader(bytes.as_slice());
        let header_len = rdr.headers().unwrap().len();
        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].len(), header_len);
        assert_eq!(&rows[1][0], "");
        assert_eq!(&rows[1][2], "");
    }

    #[test]
    fn test_optional_columns() {
        let bytes = CsvExporter::new()
            .with_byte_order_mark(false)
            .with_name_length(true)
            .with_failed_rows(true)
            .to_bytes(&table())
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "COLLECTION NUMBER,ITEM NAME,COLOR COMBO,ITEM NAME LENGTH");
        assert_eq!(lines[1], "SS24,Wrap Dress,\"Navy, White\",10");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_review_edit_recomputes_length() {
        let mut review = Vec::new();
        CsvExporter::new().write_review(&table(), &mut review).unwrap();

        let text = String::from_utf8(review).unwrap();
        assert!(text.contains("FILE,COLLECTION NUMBER,ITEM NAME,COLOR COMBO,ITEM NAME LENGTH"));

        // Someone renames the dress in a spreadsheet but leaves the old length
        let edited = text.replace("Wrap Dress,", "Floral Wrap Midi Dress Long,");
        let table = read_review(edited.as_bytes(), &schema()).unwrap();

        assert_eq!(table.len(), 2);
        let first = &table.records()[0];
        assert_eq!(first.source, "a.pdf");
        assert_eq!(first.get(ITEM_NAME), Some("Floral Wrap Midi Dress Long"));
        assert_eq!(first.name_length(), 27);
        assert_eq!(table.over_name_limit(23).count(), 1);
    }

    #[test]
    fn test_review_missing_column() {
        let input = "FILE,ITEM NAME\na.pdf,Tee\n";
        let err = read_review(input.as_bytes(), &schema()).unwrap_err();
        assert!(matches!(err, ExportError::MissingColumn(c) if c == "COLLECTION NUMBER"));
    }

    #[cfg(feature = "native")]
    #[test]
    fn test_export_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("techpacks.csv");

        CsvExporter::new().export_to_path(&table(), &path).unwrap();

        let written = std::fs::read(&path).unwrap();
        assert!(written.starts_with(UTF8_BOM));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(feature = "native")]
    #[test]
    fn test_export_to_missing_dir_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("techpacks.csv");

        assert!(CsvExporter::new().export_to_path(&table(), &path).is_err());
        assert!(!path.exists());
    }
}
