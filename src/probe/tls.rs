// src/probe/tls.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::net::TcpStream;
use tokio::time::{timeout, Duration};
use url::Url;
use x509_parser::parse_x509_certificate;

const DEFAULT_TLS_PORT: u16 = 443;

#[derive(Debug, thiserror::Error)]
pub enum TlsCheckError {
    #[error("URL has no host")]
    MissingHost,

    #[error("TLS check timed out after {0:?}")]
    Timeout(Duration),

    #[error("connection failed: {0}")]
    Connect(#[source] std::io::Error),

    #[error("TLS handshake failed: {0}")]
    Handshake(#[from] native_tls::Error),

    #[error("server presented no certificate")]
    NoCertificate,

    #[error("failed to parse certificate: {0}")]
    Parse(String),
}

/// Where the prober learns when an endpoint's certificate expires.
#[async_trait]
pub trait CertificateSource: Send + Sync {
    /// "Not after" of the leaf certificate served for `url`'s host.
    async fn expiry(&self, url: &Url) -> Result<DateTime<Utc>, TlsCheckError>;
}

/// Opens a TLS session to read the peer certificate's validity.
pub struct CertificateInspector {
    connector: tokio_native_tls::TlsConnector,
    timeout: Duration,
}

impl CertificateInspector {
    pub fn new(timeout: Duration) -> Result<Self, TlsCheckError> {
        let connector = native_tls::TlsConnector::new()?;
        Ok(Self {
            connector: connector.into(),
            timeout,
        })
    }

    async fn handshake(&self, host: &str, port: u16) -> Result<DateTime<Utc>, TlsCheckError> {
        let tcp = TcpStream::connect((host, port))
            .await
            .map_err(TlsCheckError::Connect)?;
        let stream = self.connector.connect(host, tcp).await?;

        let certificate = stream
            .get_ref()
            .peer_certificate()?
            .ok_or(TlsCheckError::NoCertificate)?;

        not_after(&certificate.to_der()?)
    }
}

#[async_trait]
impl CertificateSource for CertificateInspector {
    async fn expiry(&self, url: &Url) -> Result<DateTime<Utc>, TlsCheckError> {
        let host = url
            .host_str()
            .map(|h| h.trim_start_matches('[').trim_end_matches(']'))
            .ok_or(TlsCheckError::MissingHost)?;
        let port = url.port_or_known_default().unwrap_or(DEFAULT_TLS_PORT);

        timeout(self.timeout, self.handshake(host, port))
            .await
            .map_err(|_| TlsCheckError::Timeout(self.timeout))?
    }
}

pub fn not_after(der: &[u8]) -> Result<DateTime<Utc>, TlsCheckError> {
    let (_, cert) = parse_x509_certificate(der)
        .map_err(|e| TlsCheckError::Parse(format!("{:?}", e)))?;

    let timestamp = cert.validity().not_after.timestamp();
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .ok_or_else(|| TlsCheckError::Parse(format!("not-after out of range: {}", timestamp)))
}
