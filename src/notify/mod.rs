// src/notify/mod.rs
mod webhook;

pub use webhook::{format_message, NotifyError, Notifier, WebhookNotifier};
