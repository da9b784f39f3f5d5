//! Batch processing command for multiple techpack files.

use std::path::PathBuf;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use tpx_core::{BatchProcessor, BatchReport, CsvExporter, FailurePolicy, PdfExtractor};

use super::{load_config, styled_length};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob patterns, processed in the order given
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output CSV (default: file name from config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write an editable review CSV with file names and lengths
    #[arg(long)]
    review: Option<PathBuf>,

    /// Stop at the first document that cannot be read
    #[arg(long)]
    fail_fast: bool,

    /// Append the ITEM NAME LENGTH column to the export
    #[arg(long)]
    with_length: bool,

    /// Do not print the summary table
    #[arg(short, long)]
    quiet: bool,
}

pub fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if args.fail_fast {
        config.batch.on_error = FailurePolicy::Abort;
    }
    if args.with_length {
        config.export.include_name_length = true;
    }

    let files = expand_inputs(&args.inputs)?;
    if files.is_empty() {
        anyhow::bail!("No PDF files found for: {}", args.inputs.join(" "));
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("=>-"),
    );
    pb.set_message("Starting…");

    let processor = BatchProcessor::<PdfExtractor>::from_config(&config)?;
    let report = processor.run(&files, |done, total, source| {
        pb.set_position(done as u64);
        pb.set_message(format!("Processed {} of {}", done, total));
        debug!("Finished {}", source);
    });
    pb.finish_and_clear();
    let report = report?;

    if !args.quiet {
        print_summary(&report, config.export.name_length_threshold);
    }

    let exporter = CsvExporter::from_config(&config.export);

    if let Some(review_path) = &args.review {
        exporter.review_to_path(&report.table, review_path)?;
        println!(
            "{} Review file written to {}",
            style("✓").green(),
            review_path.display()
        );
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.export.file_name));
    exporter.export_to_path(&report.table, &output)?;

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        report.table.len(),
        report.elapsed
    );
    println!(
        "   {} successful, {} failed",
        style(report.succeeded()).green(),
        style(report.failures.len()).red()
    );
    println!(
        "{} Export written to {}",
        style("✓").green(),
        output.display()
    );

    if !report.failures.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for failure in &report.failures {
            println!("  - {}: {}", failure.source, failure.error);
        }
    }

    Ok(())
}

/// Expand each argument as a glob, keeping argument order. Only PDFs are kept.
fn expand_inputs(inputs: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        let mut matched: Vec<PathBuf> = glob(input)?.filter_map(|r| r.ok()).collect();
        if matched.is_empty() {
            // Not a pattern match; let the batch report the missing file
            matched.push(PathBuf::from(input));
        }

        files.extend(matched.into_iter().filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
        }));
    }

    Ok(files)
}

fn print_summary(report: &BatchReport, threshold: usize) {
    println!();
    println!("{}", style("Summary").bold());

    let name_field = report.table.schema().name_field();
    let width = report
        .table
        .iter()
        .map(|r| r.source.chars().count())
        .max()
        .unwrap_or(0);

    for record in report.table.iter() {
        if let Some(error) = &record.error {
            println!(
                "  {:width$}  {}",
                record.source,
                style(format!("error: {}", error)).red(),
                width = width
            );
            continue;
        }

        println!(
            "  {:width$}  {:>3}  {}",
            record.source,
            styled_length(record.name_length(), threshold),
            record.get(name_field).unwrap_or(""),
            width = width
        );
    }

    let over = report.table.over_name_limit(threshold).count();
    if over > 0 {
        println!(
            "{} {} item names longer than {} characters",
            style("!").yellow(),
            over,
            threshold
        );
    }
}
