//! # Webhook Notification Sink
//!
//! Best-effort delivery of lifecycle events to an external webhook.
//! `deliver` hands the POST off to a spawned task and returns
//! immediately — the verification response never waits on, or fails
//! because of, the sink. Delivery failures are logged at debug level and
//! dropped; this is the only boundary in the system where an error is
//! swallowed.

use chrono::Utc;
use tracing::debug;

use warrant_state::NotificationSink;

/// Fire-and-forget webhook client.
pub struct WebhookSink {
    url: String,
    client: reqwest::Client,
}

impl WebhookSink {
    /// Build a sink targeting `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

impl NotificationSink for WebhookSink {
    fn deliver(&self, title: &str, description: &str) {
        // Discord-compatible embed payload.
        let payload = serde_json::json!({
            "username": "Warrant",
            "embeds": [{
                "title": title,
                "description": description,
                "timestamp": Utc::now().to_rfc3339(),
            }],
        });
        let client = self.client.clone();
        let url = self.url.clone();
        tokio::spawn(async move {
            match client.post(&url).json(&payload).send().await {
                Ok(response) if !response.status().is_success() => {
                    debug!(status = %response.status(), "webhook delivery rejected");
                }
                Err(err) => {
                    debug!(%err, "webhook delivery failed");
                }
                Ok(_) => {}
            }
        });
    }
}
