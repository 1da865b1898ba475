// src/monitor/cycle.rs
use crate::config::Settings;
use crate::history::CycleLog;
use crate::metrics::MetricsRegistry;
use crate::notify::{format_message, Notifier, WebhookNotifier};
use crate::probe::{HttpProber, ProbeResult, Prober, Status};
use crate::registry::{duplicate_names, Registry};
use crate::status::{StatusTracker, Transition};
use anyhow::{Context, Result};
use chrono::{Local, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

#[derive(Debug, Default, Clone)]
pub struct CycleReport {
    pub log_path: PathBuf,
    pub probed: usize,
    pub up: usize,
    pub down: usize,
    pub warning_ssl: usize,
    pub transitions: usize,
    pub notifications_sent: usize,
    pub notifications_failed: usize,
}

impl CycleReport {
    fn tally(&mut self, status: Status) {
        self.probed += 1;
        match status {
            Status::Up => self.up += 1,
            Status::Down => self.down += 1,
            Status::WarningSsl => self.warning_ssl += 1,
        }
    }
}

/// Runs check cycles: registry → probe → log, snapshot diff → notify.
///
/// Endpoints are probed one at a time in registry order. Two processes
/// running cycles against the same files at once will corrupt each other's
/// snapshot; schedule invocations so they never overlap.
pub struct Monitor {
    settings: Settings,
    prober: Arc<dyn Prober>,
    notifier: Arc<dyn Notifier>,
}

impl Monitor {
    pub fn new(settings: Settings, prober: Arc<dyn Prober>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            settings,
            prober,
            notifier,
        }
    }

    /// Monitor backed by real HTTP probes and webhook delivery.
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let prober = Arc::new(HttpProber::new(&settings)?);
        let notifier = Arc::new(
            WebhookNotifier::new(settings.http_timeout())
                .context("Failed to create webhook client")?,
        );
        Ok(Self::new(settings, prober, notifier))
    }

    /// One full pass over the registry. Unreachable sites are normal results;
    /// only failures to read or write the stores end the cycle early.
    pub async fn run_cycle(&self, notify: bool) -> Result<CycleReport> {
        let span = info_span!("cycle", id = %Uuid::new_v4());
        self.run_cycle_inner(notify).instrument(span).await
    }

    async fn run_cycle_inner(&self, notify: bool) -> Result<CycleReport> {
        let registry = Registry::open(
            &self.settings.registry_path,
            self.settings.default_ssl_threshold_days,
        )?;
        let endpoints = registry.list()?;
        for name in duplicate_names(&endpoints) {
            warn!("Site name {} appears more than once in {}", name, registry.path().display());
        }

        let mut tracker = StatusTracker::load(&self.settings.status_path)?;
        let mut log = CycleLog::create(&self.settings.log_dir, Local::now())?;

        let metrics = MetricsRegistry::new()?;
        let collector = metrics.collector();

        info!("Checking {} sites (notifications {})", endpoints.len(), if notify { "on" } else { "off" });

        let mut report = CycleReport::default();
        for endpoint in &endpoints {
            let result = self.prober.probe(endpoint).await;
            log_result(&result);

            log.append(&result)?;
            collector.record_probe(&result);
            report.tally(result.status);

            let Some(transition) = tracker.record(&endpoint.name, result.status) else {
                continue;
            };
            report.transitions += 1;
            info!(
                "{} changed from {} to {}",
                transition.endpoint_name, transition.previous, transition.current
            );

            if !notify {
                continue;
            }
            if let Some(webhook) = endpoint.webhook() {
                let delivered = self.send(webhook, &result, &transition).await;
                collector.record_notification(delivered);
                if delivered {
                    report.notifications_sent += 1;
                } else {
                    report.notifications_failed += 1;
                }
            }
        }

        report.log_path = log.finish()?;
        tracker.persist()?;

        collector.mark_cycle_complete(Utc::now().timestamp());
        if let Some(path) = &self.settings.metrics_file {
            metrics.write_textfile(path)?;
            debug!("Metrics written to {}", path.display());
        }

        info!(
            "Cycle complete: {} up, {} down, {} certificate warnings; log written to {}",
            report.up,
            report.down,
            report.warning_ssl,
            report.log_path.display()
        );
        Ok(report)
    }

    async fn send(&self, webhook: &str, result: &ProbeResult, transition: &Transition) -> bool {
        let message = format_message(result, transition);
        match self.notifier.notify(webhook, &message).await {
            Ok(()) => {
                debug!("Notified webhook for {}", result.endpoint_name);
                true
            }
            Err(e) => {
                error!("Failed to send notification for {}: {}", result.endpoint_name, e);
                false
            }
        }
    }
}

fn log_result(result: &ProbeResult) {
    match (result.status, result.http_status) {
        (Status::Up, _) => info!("[OK] {} is online", result.endpoint_name),
        (Status::WarningSsl, _) => warn!(
            "[WARNING_SSL] {}: certificate expires soon ({})",
            result.endpoint_name,
            result
                .ssl_expiry
                .map(|e| e.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        ),
        (Status::Down, Some(code)) => warn!("[DOWN] {} answered HTTP {}", result.endpoint_name, code),
        (Status::Down, None) => warn!(
            "[OFFLINE] {}: {}",
            result.endpoint_name,
            result.error().unwrap_or("unreachable")
        ),
    }
}
