// src/cli.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// webmon - periodic web service health checker
#[derive(Parser, Debug)]
#[command(name = "webmon")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    WEBMON_CONFIG    Settings file, YAML or JSON (default: webmon.yaml)
    RUST_LOG         Log filter (default: webmon=info)

Run `webmon check` from cron. Overlapping runs against the same files are not supported.
"#)]
pub struct Cli {
    /// Settings file; missing files fall back to defaults
    #[arg(short, long, env = "WEBMON_CONFIG", default_value = "webmon.yaml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register a site
    Add {
        name: String,
        url: String,
        /// Webhook notified on status changes
        webhook: Option<String>,
        /// Warn when the certificate has fewer days left than this
        threshold: Option<i64>,
    },
    /// Unregister a site
    Remove { name: String },
    /// List registered sites
    List,
    /// Probe every site once and record the results
    Check {
        /// Send webhook notifications for status changes
        #[arg(long, alias = "discord")]
        notify: bool,
    },
    /// Export the logged history of one or more sites
    Export {
        #[arg(required = true)]
        names: Vec<String>,
    },
}
