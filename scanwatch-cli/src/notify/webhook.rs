//! Generic JSON webhook transport

use std::time::Duration;

use async_trait::async_trait;
use scanwatch_core::{DetectedActivity, Notifier};
use tracing::{debug, warn};

/// POSTs each detection as JSON to a configured URL
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    /// Create a transport for `url`
    pub fn new(url: String) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send_activity(&self, activity: &DetectedActivity) {
        match self.client.post(&self.url).json(activity).send().await {
            Ok(resp) if resp.status().is_success() => {
                debug!(callsign = %activity.callsign, "webhook delivered");
            }
            Ok(resp) => {
                warn!(status = %resp.status(), "webhook rejected notification");
            }
            Err(e) => {
                warn!("webhook delivery failed: {e}");
            }
        }
    }

    fn name(&self) -> &'static str {
        "webhook"
    }
}
