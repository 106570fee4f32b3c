//! Notification capability
//!
//! Transports never propagate failures across this boundary: a broken
//! webhook must not take down the monitoring pipeline. The composite
//! notifier fans out to all configured transports concurrently, each
//! isolated.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A detected callsign ready for delivery
#[derive(Debug, Clone, Serialize)]
pub struct DetectedActivity {
    /// The callsign heard
    pub callsign: String,
    /// Tuned frequency in Hz when the squelch opened, if known
    pub frequency_hz: Option<u64>,
    /// Wall-clock start of the transmission
    pub timestamp: DateTime<Utc>,
    /// Transmission length in seconds
    pub duration_secs: f64,
    /// Transcript the callsign was extracted from
    pub transcription: Option<String>,
    /// Extraction confidence in [0, 1]
    pub confidence: f32,
}

/// A notification transport. `send_activity` is best-effort: failures are
/// logged inside the implementation and swallowed.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one detection
    async fn send_activity(&self, activity: &DetectedActivity);

    /// Transport name for logs
    fn name(&self) -> &'static str {
        "notifier"
    }
}

/// Fans a detection out to multiple transports concurrently
#[derive(Default)]
pub struct CompositeNotifier {
    transports: Vec<Arc<dyn Notifier>>,
}

impl CompositeNotifier {
    /// Create an empty composite
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a transport
    pub fn push(&mut self, transport: Arc<dyn Notifier>) {
        self.transports.push(transport);
    }

    /// Number of configured transports
    pub fn len(&self) -> usize {
        self.transports.len()
    }

    /// True when no transports are configured
    pub fn is_empty(&self) -> bool {
        self.transports.is_empty()
    }
}

#[async_trait]
impl Notifier for CompositeNotifier {
    async fn send_activity(&self, activity: &DetectedActivity) {
        futures::future::join_all(
            self.transports
                .iter()
                .map(|t| t.send_activity(activity)),
        )
        .await;
    }

    fn name(&self) -> &'static str {
        "composite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingNotifier(AtomicUsize);

    #[async_trait]
    impl Notifier for CountingNotifier {
        async fn send_activity(&self, _activity: &DetectedActivity) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn sample_activity() -> DetectedActivity {
        DetectedActivity {
            callsign: "W1AW".into(),
            frequency_hz: Some(144_500_000),
            timestamp: Utc::now(),
            duration_secs: 3.5,
            transcription: Some("W1AW this is F4JZW".into()),
            confidence: 0.9,
        }
    }

    #[tokio::test]
    async fn composite_fans_out_to_all_transports() {
        let a = Arc::new(CountingNotifier(AtomicUsize::new(0)));
        let b = Arc::new(CountingNotifier(AtomicUsize::new(0)));

        let mut composite = CompositeNotifier::new();
        composite.push(a.clone());
        composite.push(b.clone());

        composite.send_activity(&sample_activity()).await;

        assert_eq!(a.0.load(Ordering::SeqCst), 1);
        assert_eq!(b.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn activity_serializes_to_json() {
        let json = serde_json::to_value(sample_activity()).unwrap();
        assert_eq!(json["callsign"], "W1AW");
        assert_eq!(json["frequency_hz"], 144_500_000u64);
    }
}
