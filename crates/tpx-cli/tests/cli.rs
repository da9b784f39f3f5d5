use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const LABELS: [&str; 17] = [
    "COLLECTION NUMBER",
    "ITEM NAME",
    "CATEGORY",
    "SILHOUETTE",
    "GENDER",
    "STYLE NUMBER",
    "WEBSITE NAME",
    "SUB CATEGORY",
    "SIZE RANGE",
    "DATE",
    "FABRIC TOP",
    "DESIGNER",
    "COLOR COMBO",
    "PRINT NAME",
    "FABRIC BOTTOM",
    "FABRIC FULL GARMENT",
    "PRINT TECHNIQUE",
];

fn tpx() -> Command {
    Command::cargo_bin("tpx").unwrap()
}

/// An empty JSON object: every section falls back to defaults.
fn default_config(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("config.json");
    fs::write(&path, "{}").unwrap();
    path
}

fn write_review(dir: &Path, item_name: &str) -> PathBuf {
    let header = std::iter::once("FILE")
        .chain(LABELS)
        .chain(std::iter::once("ITEM NAME LENGTH"))
        .collect::<Vec<_>>()
        .join(",");

    let mut row = vec![String::new(); LABELS.len() + 2];
    row[0] = "floral.pdf".to_string();
    row[1] = "SS24-07".to_string();
    row[2] = item_name.to_string();
    row[LABELS.len() + 1] = "3".to_string();

    let path = dir.join("review.csv");
    fs::write(&path, format!("\u{feff}{}\n{}\n", header, row.join(","))).unwrap();
    path
}

#[test]
fn config_fields_lists_labels() {
    let dir = TempDir::new().unwrap();
    let config = default_config(&dir);

    tpx()
        .args(["config", "fields", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains(" 2. ITEM NAME [length tracked]"))
        .stdout(predicate::str::contains("10. DATE (date)"))
        .stdout(predicate::str::contains("17. PRINT TECHNIQUE"));
}

#[test]
fn config_set_then_get() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("nested").join("config.json");

    tpx()
        .args(["config", "set", "export.name_length_threshold", "30", "--config"])
        .arg(&config)
        .assert()
        .success();

    tpx()
        .args(["config", "get", "export.name_length_threshold", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("30"));
}

#[test]
fn config_set_rejects_unknown_key() {
    let dir = TempDir::new().unwrap();
    let config = default_config(&dir);

    tpx()
        .args(["config", "set", "export.colour", "red", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
}

#[test]
fn export_recomputes_lengths_from_review() {
    let dir = TempDir::new().unwrap();
    let config = default_config(&dir);
    let review = write_review(dir.path(), "Floral Wrap Midi Dress With Belt");
    let output = dir.path().join("techpacks.csv");

    tpx()
        .arg("export")
        .arg(&review)
        .arg("-o")
        .arg(&output)
        .arg("--with-length")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("floral.pdf"))
        .stdout(predicate::str::contains("Exported 1 rows"));

    let bytes = fs::read(&output).unwrap();
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"));

    let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
    let mut lines = text.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("COLLECTION NUMBER,ITEM NAME,CATEGORY"));
    assert!(!header.contains("FILE"));
    assert!(header.ends_with("PRINT TECHNIQUE,ITEM NAME LENGTH"));

    let row = lines.next().unwrap();
    assert!(row.starts_with("SS24-07,Floral Wrap Midi Dress With Belt,,"));
    assert!(row.ends_with(",32"));
}

#[test]
fn export_requires_label_columns() {
    let dir = TempDir::new().unwrap();
    let config = default_config(&dir);
    let review = dir.path().join("review.csv");
    fs::write(&review, "FILE,ITEM NAME\na.pdf,Tee\n").unwrap();

    tpx()
        .arg("export")
        .arg(&review)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing column: COLLECTION NUMBER"));
}

#[test]
fn batch_flags_unreadable_documents() {
    let dir = TempDir::new().unwrap();
    let config = default_config(&dir);
    let broken = dir.path().join("broken.pdf");
    fs::write(&broken, "not a pdf").unwrap();
    let output = dir.path().join("out.csv");

    tpx()
        .arg("batch")
        .arg(&broken)
        .arg(dir.path().join("missing.pdf"))
        .arg("-o")
        .arg(&output)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Failed files:"))
        .stdout(predicate::str::contains("broken.pdf"))
        .stdout(predicate::str::contains("missing.pdf"));

    let text = fs::read_to_string(&output).unwrap();
    assert_eq!(text.trim_start_matches('\u{feff}').lines().count(), 1);
}

#[test]
fn batch_fail_fast_aborts() {
    let dir = TempDir::new().unwrap();
    let config = default_config(&dir);
    let broken = dir.path().join("broken.pdf");
    fs::write(&broken, "not a pdf").unwrap();
    let output = dir.path().join("out.csv");

    tpx()
        .arg("batch")
        .arg(&broken)
        .arg("--fail-fast")
        .arg("-o")
        .arg(&output)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse PDF"));

    assert!(!output.exists());
}

#[test]
fn batch_without_pdfs_fails() {
    let dir = TempDir::new().unwrap();
    let config = default_config(&dir);
    let notes = dir.path().join("notes.txt");
    fs::write(&notes, "ITEM NAME Tee").unwrap();

    tpx()
        .arg("batch")
        .arg(&notes)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No PDF files found"));
}

#[test]
fn process_rejects_non_pdf() {
    let dir = TempDir::new().unwrap();
    let config = default_config(&dir);
    let notes = dir.path().join("notes.txt");
    fs::write(&notes, "ITEM NAME Tee").unwrap();

    tpx()
        .arg("process")
        .arg(&notes)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format"));
}
