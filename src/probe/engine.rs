// src/probe/engine.rs
use super::result::{classify_http_status, ssl_status, FailureKind, ProbeFailure, ProbeResult, Status};
use super::tls::{CertificateInspector, CertificateSource};
use crate::config::Settings;
use crate::registry::Endpoint;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use reqwest::Client;
use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe one endpoint. Network conditions never surface as errors; they
    /// end up in the result's status and failure.
    async fn probe(&self, endpoint: &Endpoint) -> ProbeResult;
}

pub struct HttpProber {
    client: Client,
    http_timeout: Duration,
    certificates: Arc<dyn CertificateSource>,
}

impl HttpProber {
    pub fn new(settings: &Settings) -> Result<Self> {
        let certificates = CertificateInspector::new(settings.tls_timeout())
            .context("Failed to create TLS connector")?;
        Self::with_certificates(settings, Arc::new(certificates))
    }

    pub fn with_certificates(
        settings: &Settings,
        certificates: Arc<dyn CertificateSource>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.http_timeout())
            .user_agent(concat!("webmon/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            http_timeout: settings.http_timeout(),
            certificates,
        })
    }

    async fn request(&self, endpoint: &Endpoint) -> (Option<u16>, Option<ProbeFailure>, Status) {
        let result = timeout(
            self.http_timeout,
            self.client.get(endpoint.url.as_str()).send(),
        ).await;

        match result {
            Ok(Ok(response)) => {
                let code = response.status().as_u16();
                (Some(code), None, classify_http_status(code))
            }
            Ok(Err(e)) => (None, Some(failure_from(&e)), Status::Down),
            Err(_) => (
                None,
                Some(ProbeFailure::new(
                    FailureKind::Timeout,
                    format!("Request timed out after {:?}", self.http_timeout),
                )),
                Status::Down,
            ),
        }
    }

    /// Status of a reachable HTTPS endpoint once its certificate is known.
    /// A failed lookup leaves it UP with no expiry.
    async fn certificate_status(&self, endpoint: &Endpoint) -> (Status, Option<DateTime<Utc>>) {
        match self.certificates.expiry(&endpoint.url).await {
            Ok(expiry) => {
                debug!("{} certificate expires {}", endpoint.name, expiry);
                (
                    ssl_status(expiry, Utc::now(), endpoint.ssl_threshold_days),
                    Some(expiry),
                )
            }
            Err(e) => {
                warn!("Certificate check failed for {}: {}", endpoint.name, e);
                (Status::Up, None)
            }
        }
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, endpoint: &Endpoint) -> ProbeResult {
        let timestamp = Local::now();
        let start = Instant::now();

        let (http_status, failure, status) = self.request(endpoint).await;
        let response_time_ms = start.elapsed().as_millis() as u64;

        let (status, ssl_expiry) = if status == Status::Up && endpoint.url.scheme() == "https" {
            self.certificate_status(endpoint).await
        } else {
            (status, None)
        };

        ProbeResult {
            endpoint_name: endpoint.name.clone(),
            url: endpoint.url.clone(),
            timestamp,
            http_status,
            failure,
            status,
            ssl_expiry,
            response_time_ms,
        }
    }
}

fn failure_from(error: &reqwest::Error) -> ProbeFailure {
    let kind = if error.is_timeout() {
        FailureKind::Timeout
    } else if error.is_connect() {
        FailureKind::Connect
    } else {
        FailureKind::Request
    };

    // reqwest's top-level message omits the cause ("error sending request")
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    ProbeFailure::new(kind, message)
}
