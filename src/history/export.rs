// src/history/export.rs
use super::log::{LogRecord, FILE_TIMESTAMP_FORMAT, LOG_HEADER};
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub files_scanned: usize,
    pub rows: usize,
}

/// Every `*.csv` file in `log_dir`, oldest first. Log names embed their
/// cycle timestamp, so lexical order is chronological.
pub fn log_files(log_dir: &Path) -> Result<Vec<PathBuf>> {
    if !log_dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(log_dir)
        .with_context(|| format!("Failed to list {}", log_dir.display()))?
    {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("csv") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Copy every logged row for `site_names` into a fresh export file.
pub fn export_history(
    log_dir: &Path,
    export_dir: &Path,
    site_names: &HashSet<String>,
    now: DateTime<Local>,
) -> Result<ExportSummary> {
    fs::create_dir_all(export_dir)
        .with_context(|| format!("Failed to create export directory {}", export_dir.display()))?;

    let path = export_dir.join(format!("export_{}.csv", now.format(FILE_TIMESTAMP_FORMAT)));

    // List before creating the export: log_dir may be export_dir.
    let files: Vec<PathBuf> = log_files(log_dir)?
        .into_iter()
        .filter(|f| f != &path)
        .collect();
    if files.is_empty() {
        warn!("No log files found in {}", log_dir.display());
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&path)
        .with_context(|| format!("Failed to create export file {}", path.display()))?;
    writer.write_record(LOG_HEADER)?;

    let mut rows = 0;
    for file in &files {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(file)
            .with_context(|| format!("Failed to open {}", file.display()))?;

        for record in reader.deserialize::<LogRecord>() {
            let record = record.with_context(|| format!("Malformed row in {}", file.display()))?;
            if site_names.contains(&record.name) {
                writer.serialize(&record)?;
                rows += 1;
            }
        }
        debug!("Scanned {}", file.display());
    }
    writer.flush()?;

    Ok(ExportSummary {
        path,
        files_scanned: files.len(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const HEADER: &str = "Date/Heure,Nom,URL,Code HTTP,Erreur,Statut,SSL Expiry Date\n";

    fn names(list: &[&str]) -> HashSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn read_rows(path: &Path) -> Vec<LogRecord> {
        csv::Reader::from_path(path)
            .unwrap()
            .deserialize()
            .map(|r| r.unwrap())
            .collect()
    }

    #[test]
    fn filters_by_name_across_files_in_order() {
        let dir = tempdir().unwrap();
        let logs = dir.path().join("log");
        fs::create_dir_all(&logs).unwrap();
        fs::write(
            logs.join("log_20261015_10_00_00.csv"),
            format!(
                "{HEADER}\
                 2026-10-15 10:00:00,A,https://a.example.com/,200,,UP,2027-01-01 00:00:00\n\
                 2026-10-15 10:00:01,B,https://b.example.com/,500,,DOWN,\n\
                 2026-10-15 10:00:02,A,https://a.example.com/,N/A,timed out,DOWN,\n"
            ),
        )
        .unwrap();
        fs::write(
            logs.join("log_20261016_10_00_00.csv"),
            format!("{HEADER}2026-10-16 10:00:00,B,https://b.example.com/,200,,UP,\n"),
        )
        .unwrap();
        fs::write(logs.join("notes.txt"), "A,A,A\n").unwrap();

        let exports = dir.path().join("export");
        let summary = export_history(&logs, &exports, &names(&["A"]), Local::now()).unwrap();

        assert_eq!(summary.files_scanned, 2);
        assert_eq!(summary.rows, 2);

        let rows = read_rows(&summary.path);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.name == "A"));
        assert_eq!(rows[0].timestamp, "2026-10-15 10:00:00");
        assert_eq!(rows[0].ssl_expiry, "2027-01-01 00:00:00");
        assert_eq!(rows[1].error, "timed out");

        let contents = fs::read_to_string(&summary.path).unwrap();
        assert!(contents.starts_with(HEADER));
    }

    #[test]
    fn source_logs_are_untouched() {
        let dir = tempdir().unwrap();
        let logs = dir.path().join("log");
        fs::create_dir_all(&logs).unwrap();
        let source = logs.join("log_20261015_10_00_00.csv");
        let original = format!("{HEADER}2026-10-15 10:00:00,A,https://a.example.com/,200,,UP,\n");
        fs::write(&source, &original).unwrap();

        export_history(&logs, &dir.path().join("export"), &names(&["A"]), Local::now()).unwrap();

        assert_eq!(fs::read_to_string(&source).unwrap(), original);
    }

    #[test]
    fn missing_log_dir_gives_header_only_export() {
        let dir = tempdir().unwrap();
        let summary = export_history(
            &dir.path().join("log"),
            &dir.path().join("export"),
            &names(&["A"]),
            Local::now(),
        )
        .unwrap();

        assert_eq!(summary.rows, 0);
        assert_eq!(fs::read_to_string(&summary.path).unwrap(), HEADER);
    }

    #[test]
    fn export_into_log_dir_is_not_rescanned() {
        let dir = tempdir().unwrap();
        let logs = dir.path().join("log");
        fs::create_dir_all(&logs).unwrap();
        fs::write(
            logs.join("log_20261015_10_00_00.csv"),
            format!("{HEADER}2026-10-15 10:00:00,A,https://a.example.com/,200,,UP,\n"),
        )
        .unwrap();

        let summary = export_history(&logs, &logs, &names(&["A"]), Local::now()).unwrap();

        assert_eq!(summary.files_scanned, 1);
        assert_eq!(summary.rows, 1);
        assert_eq!(read_rows(&summary.path).len(), 1);
    }
}
