// src/metrics/collector.rs
use crate::probe::{ProbeResult, Status};
use anyhow::{Context, Result};
use prometheus::{
    Encoder, Gauge, HistogramOpts, HistogramVec, IntCounterVec, IntGaugeVec, Opts, Registry,
    TextEncoder,
};
use std::fs;
use std::path::Path;
use std::sync::Arc;

pub struct MetricsRegistry {
    registry: Registry,
    collector: Arc<MetricsCollector>,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let collector = Arc::new(MetricsCollector::new(&registry)?);

        Ok(Self {
            registry,
            collector,
        })
    }

    pub fn collector(&self) -> Arc<MetricsCollector> {
        self.collector.clone()
    }

    pub fn gather(&self) -> Result<Vec<u8>> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(buffer)
    }

    /// Write the text exposition to `path` for a node-exporter textfile
    /// collector. The rename keeps scrapers from reading a partial file.
    pub fn write_textfile(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("prom.tmp");
        fs::write(&tmp, self.gather()?)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, path)
            .with_context(|| format!("Failed to replace metrics file {}", path.display()))?;
        Ok(())
    }
}

pub struct MetricsCollector {
    pub probes_total: IntCounterVec,
    pub probe_duration_seconds: HistogramVec,
    pub endpoint_up: IntGaugeVec,
    pub notifications_total: IntCounterVec,
    pub last_cycle_timestamp_seconds: Gauge,
}

impl MetricsCollector {
    pub fn new(registry: &Registry) -> Result<Self> {
        let probes_total = IntCounterVec::new(
            Opts::new("webmon_probes_total", "Probes by resulting status"),
            &["status"],
        )?;
        registry.register(Box::new(probes_total.clone()))?;

        let probe_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "webmon_probe_duration_seconds",
                "HTTP probe duration in seconds",
            ),
            &["endpoint"],
        )?;
        registry.register(Box::new(probe_duration_seconds.clone()))?;

        let endpoint_up = IntGaugeVec::new(
            Opts::new(
                "webmon_endpoint_up",
                "Endpoint status (1=up, 0=down, 2=certificate expiring)",
            ),
            &["endpoint"],
        )?;
        registry.register(Box::new(endpoint_up.clone()))?;

        let notifications_total = IntCounterVec::new(
            Opts::new("webmon_notifications_total", "Webhook notifications by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(notifications_total.clone()))?;

        let last_cycle_timestamp_seconds = Gauge::new(
            "webmon_last_cycle_timestamp_seconds",
            "Unix time the last check cycle finished",
        )?;
        registry.register(Box::new(last_cycle_timestamp_seconds.clone()))?;

        Ok(Self {
            probes_total,
            probe_duration_seconds,
            endpoint_up,
            notifications_total,
            last_cycle_timestamp_seconds,
        })
    }

    pub fn record_probe(&self, result: &ProbeResult) {
        self.probes_total
            .with_label_values(&[result.status.as_str()])
            .inc();

        self.probe_duration_seconds
            .with_label_values(&[result.endpoint_name.as_str()])
            .observe(result.response_time_ms as f64 / 1000.0);

        let value = match result.status {
            Status::Down => 0,
            Status::Up => 1,
            Status::WarningSsl => 2,
        };
        self.endpoint_up
            .with_label_values(&[result.endpoint_name.as_str()])
            .set(value);
    }

    pub fn record_notification(&self, delivered: bool) {
        let outcome = if delivered { "sent" } else { "failed" };
        self.notifications_total.with_label_values(&[outcome]).inc();
    }

    pub fn mark_cycle_complete(&self, unix_seconds: i64) {
        self.last_cycle_timestamp_seconds.set(unix_seconds as f64);
    }
}
