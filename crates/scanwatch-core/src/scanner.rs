//! Scanner coordinator
//!
//! Owns the control loop and the queue between segmentation and recognition.
//! The radio does the actual scanning; this loop watches the squelch over
//! CI-V, feeds captured audio through the segmenter, and hands completed
//! transmissions to the recognition loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{broadcast, watch};
use tokio_serial::SerialStream;
use tracing::{debug, info, warn};

use crate::callsign::extract_callsigns;
use crate::capture::AudioSource;
use crate::error::{RadioError, ScannerError};
use crate::events::ScannerEvent;
use crate::notify::{DetectedActivity, Notifier};
use crate::queue::DropOldestQueue;
use crate::radio::RadioClient;
use crate::recognizer::Recognizer;
use crate::resample::resample_linear;
use crate::segmenter::{RecordedTransmission, Segmenter, SegmenterConfig};
use crate::RECOGNITION_SAMPLE_RATE;

/// Completed transmissions waiting for the recognizer; older entries yield
/// to fresher ones when decoding cannot keep up
pub const RECOGNITION_QUEUE_CAPACITY: usize = 10;

/// Back-off after a failed poll
const ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Event channel depth for observers
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Coordinator tuning
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Squelch poll period
    pub poll_interval: Duration,
    /// Callsigns below this extraction confidence are logged, not dispatched
    pub min_callsign_confidence: f32,
    /// Segmenter tuning
    pub segmenter: SegmenterConfig,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(50),
            min_callsign_confidence: 0.5,
            segmenter: SegmenterConfig::default(),
        }
    }
}

/// The top-level monitoring pipeline
pub struct Scanner<T = SerialStream> {
    radio: RadioClient<T>,
    audio: Box<dyn AudioSource>,
    recognizer: Arc<dyn Recognizer>,
    notifier: Arc<dyn Notifier>,
    config: ScannerConfig,
    events: broadcast::Sender<ScannerEvent>,
}

impl<T> Scanner<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Compose the pipeline from its collaborators
    pub fn new(
        radio: RadioClient<T>,
        audio: Box<dyn AudioSource>,
        recognizer: Arc<dyn Recognizer>,
        notifier: Arc<dyn Notifier>,
        config: ScannerConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            radio,
            audio,
            recognizer,
            notifier,
            config,
            events,
        }
    }

    /// Subscribe to scanner activity events
    pub fn subscribe(&self) -> broadcast::Receiver<ScannerEvent> {
        self.events.subscribe()
    }

    /// Run until the shutdown signal flips to true.
    ///
    /// Spawns the recognition loop, then drives the control loop on the
    /// current task. On shutdown: stop capture, close the recognition queue,
    /// await the recognition drain.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Result<(), ScannerError> {
        if !self.recognizer.is_ready() {
            if self.recognizer.initialize() {
                info!("recognizer initialized");
            } else {
                warn!("recognizer unavailable; transmissions will not be transcribed");
            }
        }

        self.audio.start()?;
        info!("audio capture started");

        let recognition_queue = Arc::new(DropOldestQueue::new(RECOGNITION_QUEUE_CAPACITY));
        let recognition_task = tokio::spawn(recognition_loop(
            recognition_queue.clone(),
            self.recognizer.clone(),
            self.notifier.clone(),
            self.config.min_callsign_confidence,
            self.events.clone(),
        ));

        let mut segmenter = Segmenter::new(self.config.segmenter.clone());
        let mut prev_open = false;
        let mut current_frequency: Option<u64> = None;

        while !*shutdown.borrow() {
            let pause = match self
                .poll_tick(
                    &mut segmenter,
                    &mut prev_open,
                    &mut current_frequency,
                    &recognition_queue,
                )
                .await
            {
                Ok(()) => self.config.poll_interval,
                Err(e) => {
                    warn!("squelch poll failed: {e}");
                    let _ = self.events.send(ScannerEvent::Error {
                        message: e.to_string(),
                    });
                    ERROR_BACKOFF
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(pause) => {}
                _ = shutdown.changed() => {}
            }
        }

        info!("scanner shutting down");
        self.audio.stop();
        recognition_queue.close();
        if let Err(e) = recognition_task.await {
            warn!("recognition task join failed: {e}");
        }
        Ok(())
    }

    /// One control-loop tick: poll the gate, handle edges, feed one chunk.
    async fn poll_tick(
        &mut self,
        segmenter: &mut Segmenter,
        prev_open: &mut bool,
        current_frequency: &mut Option<u64>,
        recognition_queue: &DropOldestQueue<RecordedTransmission>,
    ) -> Result<(), RadioError> {
        // A timed-out or malformed poll reads as closed; the next tick
        // re-polls.
        let gate_open = self.radio.is_squelch_open().await?.unwrap_or(false);

        if gate_open && !*prev_open {
            // Fresh open edge: tag the transmission with the tuned frequency
            // and drop pre-roll swept up from the previous scan channel.
            *current_frequency = self.radio.read_frequency().await?;
            segmenter.reset();
            debug!(frequency_hz = ?*current_frequency, "squelch opened");
            let _ = self.events.send(ScannerEvent::SquelchOpened {
                frequency_hz: *current_frequency,
            });
        } else if !gate_open && *prev_open {
            debug!("squelch closed");
            let _ = self.events.send(ScannerEvent::SquelchClosed);
        }

        if let Some(chunk) = self.audio.try_next_chunk() {
            if let Some(mut transmission) = segmenter.feed(&chunk.samples, gate_open) {
                transmission.frequency_hz = *current_frequency;
                let duration_secs = transmission.duration_secs();
                info!(
                    duration_secs,
                    frequency_hz = ?transmission.frequency_hz,
                    "transmission recorded"
                );
                let _ = self.events.send(ScannerEvent::TransmissionRecorded {
                    duration_secs,
                    frequency_hz: transmission.frequency_hz,
                });
                if recognition_queue.push(transmission).is_some() {
                    debug!("recognition queue full; dropped oldest transmission");
                }
            }
        }

        *prev_open = gate_open;
        Ok(())
    }
}

/// Drains the recognition queue: resample, transcribe, extract, notify.
///
/// The recognizer serializes decoding internally; this loop is its only
/// caller in the pipeline. Shutdown closes the queue, which keeps yielding
/// already-recorded transmissions until empty, so nothing recorded before
/// the shutdown is lost.
async fn recognition_loop(
    queue: Arc<DropOldestQueue<RecordedTransmission>>,
    recognizer: Arc<dyn Recognizer>,
    notifier: Arc<dyn Notifier>,
    min_confidence: f32,
    events: broadcast::Sender<ScannerEvent>,
) {
    while let Some(transmission) = queue.pop().await {
        let duration_secs = transmission.duration_secs();
        let started_at = transmission.started_at;
        let frequency_hz = transmission.frequency_hz;

        let samples = if transmission.sample_rate != RECOGNITION_SAMPLE_RATE {
            resample_linear(
                &transmission.samples,
                transmission.sample_rate,
                RECOGNITION_SAMPLE_RATE,
            )
        } else {
            transmission.samples
        };

        let rec = recognizer.clone();
        let transcription =
            match tokio::task::spawn_blocking(move || rec.transcribe(&samples)).await {
                Ok(Ok(t)) => t,
                Ok(Err(e)) => {
                    warn!("transcription failed: {e}");
                    continue;
                }
                Err(e) => {
                    warn!("transcription task panicked: {e}");
                    continue;
                }
            };

        if transcription.is_empty() {
            info!(duration_secs, "transmission produced no text");
            continue;
        }

        let text = transcription.text.trim().to_string();
        debug!(%text, "transcription ready");
        let _ = events.send(ScannerEvent::TranscriptionReady { text: text.clone() });

        for callsign in extract_callsigns(&text) {
            if callsign.confidence < min_confidence {
                debug!(
                    callsign = %callsign.text,
                    confidence = callsign.confidence,
                    "callsign below confidence threshold"
                );
                continue;
            }

            let activity = DetectedActivity {
                callsign: callsign.text.clone(),
                frequency_hz,
                timestamp: started_at,
                duration_secs,
                transcription: Some(text.clone()),
                confidence: callsign.confidence,
            };
            info!(
                callsign = %activity.callsign,
                frequency_hz = ?frequency_hz,
                confidence = activity.confidence,
                "callsign detected"
            );
            notifier.send_activity(&activity).await;
            let _ = events.send(ScannerEvent::CallsignDetected {
                callsign: callsign.text,
                confidence: callsign.confidence,
            });
        }
    }
    debug!("recognition loop drained");
}
