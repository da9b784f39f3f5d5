//! Export command - turn an edited review file into the final CSV.

use std::fs::File;
use std::path::PathBuf;

use clap::Args;
use console::style;

use tpx_core::{CsvExporter, read_review};

use super::{load_config, styled_length};

/// Arguments for the export command.
#[derive(Args)]
pub struct ExportArgs {
    /// Review CSV written by `tpx batch --review` (possibly edited)
    #[arg(required = true)]
    review: PathBuf,

    /// Output CSV (default: file name from config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Append the ITEM NAME LENGTH column to the export
    #[arg(long)]
    with_length: bool,
}

pub fn run(args: ExportArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if args.with_length {
        config.export.include_name_length = true;
    }

    let schema = config.extraction.field_set()?;
    let file = File::open(&args.review)
        .map_err(|e| anyhow::anyhow!("Cannot open {}: {}", args.review.display(), e))?;

    // Lengths are recomputed from the edited values on import
    let table = read_review(file, &schema)?;
    if table.is_empty() {
        anyhow::bail!("Review file {} has no rows", args.review.display());
    }

    let threshold = config.export.name_length_threshold;
    for record in table.over_name_limit(threshold) {
        println!(
            "{} {}: {} is {} characters",
            style("!").yellow(),
            record.source,
            schema.name_field(),
            styled_length(record.name_length(), threshold)
        );
    }

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(&config.export.file_name));
    CsvExporter::from_config(&config.export).export_to_path(&table, &output)?;

    println!(
        "{} Exported {} rows to {}",
        style("✓").green(),
        table.len(),
        output.display()
    );

    Ok(())
}
