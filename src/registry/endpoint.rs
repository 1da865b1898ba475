// src/registry/endpoint.rs
use url::Url;

pub const DEFAULT_SSL_THRESHOLD_DAYS: i64 = 30;

/// A monitored site. `name` is the registry key, stored trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub name: String,
    pub url: Url,
    webhook: Option<String>,
    pub ssl_threshold_days: i64,
}

impl Endpoint {
    pub fn new(name: impl Into<String>, url: Url) -> Self {
        let name: String = name.into();
        Self {
            name: name.trim().to_string(),
            url,
            webhook: None,
            ssl_threshold_days: DEFAULT_SSL_THRESHOLD_DAYS,
        }
    }

    /// Blank webhooks mean "none".
    pub fn with_webhook(mut self, webhook: impl Into<String>) -> Self {
        let webhook: String = webhook.into();
        let webhook = webhook.trim();
        self.webhook = (!webhook.is_empty()).then(|| webhook.to_string());
        self
    }

    pub fn with_ssl_threshold(mut self, days: i64) -> Self {
        self.ssl_threshold_days = days;
        self
    }

    /// Webhook to notify on transitions, if one is configured.
    pub fn webhook(&self) -> Option<&str> {
        self.webhook.as_deref()
    }
}
