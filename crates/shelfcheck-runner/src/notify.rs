//! Notification sink.

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

/// Best-effort message sink shared by all workers.
///
/// Delivery failures are reported through the return value and never
/// turned into task failures.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    /// Deliver a message. Returns true if it was accepted.
    async fn notify(&self, message: &str) -> bool;
}

/// Posts `{"text": ...}` to an incoming webhook (Slack and compatibles).
pub struct WebhookNotifier {
    inner: reqwest::Client,
    webhook_url: String,
}

impl WebhookNotifier {
    /// Create a new notifier for a webhook URL.
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            inner: reqwest::Client::new(),
            webhook_url: webhook_url.into(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, message: &str) -> bool {
        let body = json!({ "text": message });

        match self.inner.post(&self.webhook_url).json(&body).send().await {
            Ok(response) if response.status().is_success() => {
                debug!("Notification sent");
                true
            }
            Ok(response) => {
                warn!(status = %response.status(), "Failed to send notification");
                false
            }
            Err(e) => {
                // reqwest errors embed the URL; webhook URLs carry a secret.
                warn!(error = %e.without_url(), "Error sending notification");
                false
            }
        }
    }
}
