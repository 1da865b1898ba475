// src/main.rs
use anyhow::Result;
use chrono::Local;
use clap::Parser;
use std::collections::HashSet;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use webmon::{
    cli::{Cli, Commands},
    config::{self, Settings},
    history::export_history,
    monitor::Monitor,
    registry::{parse_url, Endpoint, Registry},
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("webmon=info")),
        )
        .init();

    let cli = Cli::parse();

    info!("Loading configuration from: {}", cli.config.display());
    let settings = config::load_config(&cli.config).await?;

    match cli.command {
        Commands::Add { name, url, webhook, threshold } => {
            let registry = open_registry(&settings)?;
            let endpoint = Endpoint::new(name.clone(), parse_url(&name, &url)?)
                .with_webhook(webhook.unwrap_or_default())
                .with_ssl_threshold(threshold.unwrap_or(settings.default_ssl_threshold_days));
            registry.add(&endpoint)?;
        }
        Commands::Remove { name } => {
            if !open_registry(&settings)?.remove(&name)? {
                warn!("No site named {}", name);
            }
        }
        Commands::List => {
            let endpoints = open_registry(&settings)?.list()?;
            if endpoints.is_empty() {
                println!("No sites configured.");
            }
            for e in endpoints {
                println!(
                    "{} -> {} (webhook: {}, SSL expiry threshold: {} days)",
                    e.name,
                    e.url,
                    e.webhook().unwrap_or("none"),
                    e.ssl_threshold_days
                );
            }
        }
        Commands::Check { notify } => {
            let monitor = Monitor::from_settings(settings)?;
            let report = monitor.run_cycle(notify).await?;
            println!("Log file written: {}", report.log_path.display());
        }
        Commands::Export { names } => {
            let names: HashSet<String> = names.into_iter().collect();
            let summary = export_history(&settings.log_dir, &settings.export_dir, &names, Local::now())?;
            info!(
                "Exported {} rows from {} log files",
                summary.rows, summary.files_scanned
            );
            println!("Report exported: {}", summary.path.display());
        }
    }

    Ok(())
}

fn open_registry(settings: &Settings) -> Result<Registry> {
    Ok(Registry::open(&settings.registry_path, settings.default_ssl_threshold_days)?)
}
