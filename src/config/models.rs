// src/config/models.rs
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// CSV file holding the monitored endpoints.
    pub registry_path: PathBuf,
    /// Last-known status per endpoint, rewritten at the end of each cycle.
    pub status_path: PathBuf,
    /// One CSV file per check cycle lands here.
    pub log_dir: PathBuf,
    pub export_dir: PathBuf,
    pub http_timeout_secs: u64,
    pub tls_timeout_secs: u64,
    /// Threshold used when a registry row leaves it blank.
    pub default_ssl_threshold_days: i64,
    /// Prometheus textfile output, skipped when unset.
    pub metrics_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            registry_path: PathBuf::from("web_services.csv"),
            status_path: PathBuf::from("status.json"),
            log_dir: PathBuf::from("log"),
            export_dir: PathBuf::from("export"),
            http_timeout_secs: 5,
            tls_timeout_secs: 5,
            default_ssl_threshold_days: 30,
            metrics_file: None,
        }
    }
}

impl Settings {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn tls_timeout(&self) -> Duration {
        Duration::from_secs(self.tls_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout("http_timeout_secs"));
        }
        if self.tls_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout("tls_timeout_secs"));
        }
        if self.default_ssl_threshold_days < 0 {
            return Err(ConfigError::NegativeThreshold(self.default_ssl_threshold_days));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("default_ssl_threshold_days must not be negative (got {0})")]
    NegativeThreshold(i64),
}
