// src/probe/mod.rs
mod engine;
mod result;
mod tls;

pub use engine::{HttpProber, Prober};
pub use result::{
    classify_http_status, days_remaining, ssl_status, FailureKind, ProbeFailure, ProbeResult,
    Status,
};
pub use tls::{not_after, CertificateInspector, CertificateSource, TlsCheckError};
