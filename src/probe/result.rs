// src/probe/result.rs
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Up,
    Down,
    /// Reachable, but the certificate expires within the site's threshold.
    WarningSsl,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Up => "UP",
            Status::Down => "DOWN",
            Status::WarningSsl => "WARNING_SSL",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Status::Up => "🟢",
            Status::Down => "🔴",
            Status::WarningSsl => "⚠️",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    Connect,
    Request,
}

/// Why an endpoint could not be reached at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl ProbeFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }
}

#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub endpoint_name: String,
    pub url: Url,
    pub timestamp: DateTime<Local>,
    pub http_status: Option<u16>,
    pub failure: Option<ProbeFailure>,
    pub status: Status,
    pub ssl_expiry: Option<DateTime<Utc>>,
    pub response_time_ms: u64,
}

impl ProbeResult {
    pub fn error(&self) -> Option<&str> {
        self.failure.as_ref().map(|f| f.message.as_str())
    }
}

/// Status for a completed HTTP exchange.
pub fn classify_http_status(code: u16) -> Status {
    if (200..300).contains(&code) {
        Status::Up
    } else {
        Status::Down
    }
}

/// Whole days until `expiry`, rounded towards negative infinity.
pub fn days_remaining(expiry: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (expiry - now).num_seconds().div_euclid(SECONDS_PER_DAY)
}

/// Status of an otherwise healthy endpoint given its certificate expiry.
pub fn ssl_status(expiry: DateTime<Utc>, now: DateTime<Utc>, threshold_days: i64) -> Status {
    if days_remaining(expiry, now) < threshold_days {
        Status::WarningSsl
    } else {
        Status::Up
    }
}
