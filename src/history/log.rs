// src/history/log.rs
use crate::probe::ProbeResult;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const LOG_HEADER: [&str; 7] = [
    "Date/Heure",
    "Nom",
    "URL",
    "Code HTTP",
    "Erreur",
    "Statut",
    "SSL Expiry Date",
];

pub(crate) const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H_%M_%S";
const ROW_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const MISSING_HTTP_CODE: &str = "N/A";

/// One row of a cycle log or export. Fields stay textual so export copies
/// rows through exactly as they were written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    #[serde(rename = "Date/Heure")]
    pub timestamp: String,
    #[serde(rename = "Nom")]
    pub name: String,
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "Code HTTP")]
    pub http_code: String,
    #[serde(rename = "Erreur")]
    pub error: String,
    #[serde(rename = "Statut")]
    pub status: String,
    #[serde(rename = "SSL Expiry Date")]
    pub ssl_expiry: String,
}

impl From<&ProbeResult> for LogRecord {
    fn from(result: &ProbeResult) -> Self {
        Self {
            timestamp: result.timestamp.format(ROW_TIMESTAMP_FORMAT).to_string(),
            name: result.endpoint_name.clone(),
            url: result.url.to_string(),
            http_code: result
                .http_status
                .map(|c| c.to_string())
                .unwrap_or_else(|| MISSING_HTTP_CODE.to_string()),
            error: result.error().unwrap_or_default().to_string(),
            status: result.status.to_string(),
            ssl_expiry: result
                .ssl_expiry
                .map(|e| e.format(ROW_TIMESTAMP_FORMAT).to_string())
                .unwrap_or_default(),
        }
    }
}

pub fn log_file_name(started: DateTime<Local>) -> String {
    format!("log_{}.csv", started.format(FILE_TIMESTAMP_FORMAT))
}

/// Append-only CSV for a single check cycle.
pub struct CycleLog {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl CycleLog {
    /// Open (or continue) the log for a cycle started at `started`.
    pub fn create(log_dir: &Path, started: DateTime<Local>) -> Result<Self> {
        fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

        let path = log_dir.join(log_file_name(started));
        let is_new = !path.exists();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if is_new {
            writer.write_record(LOG_HEADER)?;
            writer.flush()?;
        }

        debug!("Writing cycle log to {}", path.display());
        Ok(Self { path, writer })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&mut self, result: &ProbeResult) -> Result<()> {
        self.writer
            .serialize(LogRecord::from(result))
            .with_context(|| format!("Failed to append to {}", self.path.display()))?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<PathBuf> {
        self.writer.flush()?;
        Ok(self.path)
    }
}
