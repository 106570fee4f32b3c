//! Scan Monitor Core
//!
//! This crate provides the monitoring pipeline for a memory-channel-scanning
//! transceiver: the radio performs the scan and stops on channels whose
//! squelch opens; we watch those squelch transitions over CI-V, record the
//! squelch-gated audio, transcribe it, and extract amateur-radio callsigns.
//!
//! # Architecture
//!
//! Three cooperating tasks joined by bounded, drop-oldest queues:
//!
//! ```text
//! audio callback ──> [audio queue, cap 100] ──┐
//!                                             v
//! control loop: poll squelch ──> segmenter ──> [recognition queue, cap 10]
//!                                             v
//! recognition loop: resample ──> transcribe ──> extract ──> notify
//! ```
//!
//! The control loop polls the squelch every 50 ms and feeds audio to the
//! [`segmenter::Segmenter`]; completed transmissions move to the recognition
//! loop, which serializes access to the (non-reentrant) recognizer. Both
//! queues drop their oldest entry on overflow: for live monitoring, recency
//! beats completeness, and the audio callback must never block.
//!
//! External capabilities (audio capture, speech recognition, notification
//! delivery) are injected through the [`capture::AudioSource`],
//! [`recognizer::Recognizer`] and [`notify::Notifier`] traits.

pub mod callsign;
pub mod capture;
pub mod error;
pub mod events;
pub mod notify;
pub mod queue;
pub mod radio;
pub mod recognizer;
pub mod resample;
pub mod scanner;
pub mod segmenter;

pub use callsign::{extract_callsigns, ExtractedCallsign, ExtractionMethod};
pub use capture::{AudioChunk, AudioSource, AUDIO_QUEUE_CAPACITY};
pub use error::{AudioSourceError, RadioError, RecognizerError, ScannerError};
pub use events::ScannerEvent;
pub use notify::{CompositeNotifier, DetectedActivity, Notifier};
pub use queue::DropOldestQueue;
pub use radio::{RadioClient, RadioConfig};
pub use recognizer::{Recognizer, Transcription};
pub use scanner::{Scanner, ScannerConfig};
pub use segmenter::{RecordedTransmission, Segmenter, SegmenterConfig};

/// Sample rate expected by the recognizer, in Hz
pub const RECOGNITION_SAMPLE_RATE: u32 = 16_000;
