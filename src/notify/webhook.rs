// src/notify/webhook.rs
use crate::probe::{ProbeResult, Status};
use crate::status::Transition;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::json;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("webhook request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("webhook answered {0}")]
    Status(StatusCode),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `message` once. Callers log failures and move on.
    async fn notify(&self, webhook_url: &str, message: &str) -> Result<(), NotifyError>;
}

/// Posts `{"content": message}`, the shape Discord-style chat webhooks accept.
pub struct WebhookNotifier {
    client: Client,
}

impl WebhookNotifier {
    pub fn new(timeout: Duration) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, webhook_url: &str, message: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(webhook_url)
            .json(&json!({ "content": message }))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(NotifyError::Status(status))
        }
    }
}

pub fn format_message(result: &ProbeResult, transition: &Transition) -> String {
    let mut message = format!(
        "{} **{}** is **{}** (was {})\n{}",
        transition.current.emoji(),
        result.endpoint_name,
        transition.current,
        transition.previous,
        result.url
    );

    if transition.current == Status::WarningSsl {
        if let Some(expiry) = result.ssl_expiry {
            message.push_str(&format!(
                "\nThe SSL certificate expires on {}.",
                expiry.format("%Y-%m-%d %H:%M:%S UTC")
            ));
        }
    }

    message
}
