//! ntfy.sh push transport

use std::time::Duration;

use async_trait::async_trait;
use scanwatch_core::{DetectedActivity, Notifier};
use tracing::{debug, warn};

use super::format_frequency;

/// Publishes a short text message per detection to an ntfy topic
pub struct NtfyNotifier {
    client: reqwest::Client,
    publish_url: String,
}

impl NtfyNotifier {
    /// Create a transport for `server`/`topic`
    pub fn new(server: &str, topic: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            publish_url: format!("{}/{}", server.trim_end_matches('/'), topic),
        })
    }
}

#[async_trait]
impl Notifier for NtfyNotifier {
    async fn send_activity(&self, activity: &DetectedActivity) {
        let mut body = format!(
            "{} heard on {} ({:.1} s)",
            activity.callsign,
            format_frequency(activity.frequency_hz),
            activity.duration_secs,
        );
        if let Some(text) = &activity.transcription {
            body.push_str("\n\"");
            body.push_str(text);
            body.push('"');
        }

        let result = self
            .client
            .post(&self.publish_url)
            .header("Title", format!("Callsign detected: {}", activity.callsign))
            .header("Tags", "radio")
            .body(body)
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => {
                debug!(callsign = %activity.callsign, "ntfy delivered");
            }
            Ok(resp) => {
                warn!(status = %resp.status(), "ntfy rejected notification");
            }
            Err(e) => {
                warn!("ntfy delivery failed: {e}");
            }
        }
    }

    fn name(&self) -> &'static str {
        "ntfy"
    }
}
