//! Notification transports
//!
//! Each transport logs and swallows its own failures; a broken endpoint
//! never stalls the pipeline.

mod ntfy;
mod webhook;

pub use ntfy::NtfyNotifier;
pub use webhook::WebhookNotifier;

use async_trait::async_trait;
use scanwatch_core::{DetectedActivity, Notifier};
use tracing::info;

/// Fallback transport that just logs detections; used when no external
/// transport is configured so detections remain visible.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_activity(&self, activity: &DetectedActivity) {
        info!(
            callsign = %activity.callsign,
            frequency = %format_frequency(activity.frequency_hz),
            duration_secs = activity.duration_secs,
            confidence = activity.confidence,
            "activity detected"
        );
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// Render a frequency for humans, e.g. `144.500 MHz`
pub fn format_frequency(hz: Option<u64>) -> String {
    match hz {
        Some(hz) => format!("{:.3} MHz", hz as f64 / 1_000_000.0),
        None => "unknown".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_formatting() {
        assert_eq!(format_frequency(Some(144_500_000)), "144.500 MHz");
        assert_eq!(format_frequency(Some(7_074_000)), "7.074 MHz");
        assert_eq!(format_frequency(None), "unknown");
    }
}
