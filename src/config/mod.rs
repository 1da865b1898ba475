// src/config/mod.rs
mod models;

pub use models::*;

use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

/// Load settings from a file (YAML or JSON).
///
/// A missing file is not an error: every field has a default, so a fresh
/// checkout runs against `web_services.csv`, `status.json`, `log/` and
/// `export/` in the working directory.
pub async fn load_config<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();

    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        debug!("No config file at {}, using defaults", path.display());
        let settings = Settings::default();
        settings.validate()?;
        return Ok(settings);
    }

    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let settings: Settings = if path.extension().and_then(|s| s.to_str()) == Some("yaml")
        || path.extension().and_then(|s| s.to_str()) == Some("yml") {
        serde_yaml::from_str(&contents).context("Failed to parse YAML config")?
    } else {
        serde_json::from_str(&contents).context("Failed to parse JSON config")?
    };

    settings.validate()?;
    Ok(settings)
}
