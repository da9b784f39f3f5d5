//! Process command - extract fields from a single techpack.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use tpx_core::batch::source_name;
use tpx_core::models::record::NAME_LENGTH_COLUMN;
use tpx_core::{
    BatchProcessor, CsvExporter, PdfExtractor, RecordTable, TechpackParser, TechpackRecord,
    TpxConfig,
};

use super::{load_config, styled_length};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input techpack PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Page to read fields from (overrides config)
    #[arg(long)]
    page: Option<u32>,

    /// Print the acquired page text instead of fields
    #[arg(long)]
    raw_text: bool,

    /// Keep values as written (no date normalization)
    #[arg(long)]
    no_normalize: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(page) = args.page {
        config.pdf.page = page;
    }
    if args.no_normalize {
        config.extraction.normalize_values = false;
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let extension = args
        .input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    if extension != "pdf" {
        anyhow::bail!("Unsupported file format: {}", extension);
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")?
            .progress_chars("##-"),
    );

    pb.set_message("Loading PDF...");
    pb.set_position(10);

    let processor = BatchProcessor::<PdfExtractor>::from_config(&config)?;
    let data = fs::read(&args.input)?;

    pb.set_message("Extracting text...");
    pb.set_position(40);
    let text = processor.acquire_text(&data)?;

    if args.raw_text {
        pb.finish_and_clear();
        return emit(&args, &text);
    }

    pb.set_message("Extracting fields...");
    pb.set_position(70);
    let result = processor.parser().parse(&text);
    if !result.missing.is_empty() {
        info!("Labels not found: {}", result.missing.join(", "));
    }
    let record = result.into_record(source_name(&args.input), processor.parser().schema());

    pb.finish_with_message("Done");

    let output = format_record(&record, &config, args.format, args.output.is_some())?;
    emit(&args, &output)?;

    debug!("Total processing time: {:?}", start.elapsed());
    Ok(())
}

fn emit(args: &ProcessArgs, output: &str) -> anyhow::Result<()> {
    if let Some(output_path) = &args.output {
        fs::write(output_path, output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }
    Ok(())
}

/// `to_file` output keeps the BOM and carries no terminal styling.
fn format_record(
    record: &TechpackRecord,
    config: &TpxConfig,
    format: OutputFormat,
    to_file: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Csv => format_csv(record, config, to_file),
        OutputFormat::Text => Ok(format_text(record, config, !to_file)),
    }
}

fn format_csv(
    record: &TechpackRecord,
    config: &TpxConfig,
    byte_order_mark: bool,
) -> anyhow::Result<String> {
    let mut table = RecordTable::new(config.extraction.field_set()?);
    table.push(record.clone());

    let bytes = CsvExporter::from_config(&config.export)
        .with_byte_order_mark(byte_order_mark && config.export.byte_order_mark)
        .to_bytes(&table)?;
    Ok(String::from_utf8(bytes)?)
}

fn format_text(record: &TechpackRecord, config: &TpxConfig, styled: bool) -> String {
    let width = record
        .fields()
        .iter()
        .map(|f| f.label.len())
        .chain(std::iter::once(NAME_LENGTH_COLUMN.len()))
        .max()
        .unwrap_or(0);

    let mut output = String::new();
    output.push_str(&format!("File: {}\n\n", record.source));

    for field in record.fields() {
        output.push_str(&format!("{:width$}  {}\n", field.label, field.value, width = width));
    }

    let length = if styled {
        styled_length(record.name_length(), config.export.name_length_threshold).to_string()
    } else {
        record.name_length().to_string()
    };
    output.push_str(&format!(
        "\n{:width$}  {}\n",
        NAME_LENGTH_COLUMN,
        length,
        width = width
    ));

    output
}
