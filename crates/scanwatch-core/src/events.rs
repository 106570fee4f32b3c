//! Unified event stream for the scanner
//!
//! All scanner activity (squelch transitions, recordings, transcriptions,
//! detections, recoverable errors) is emitted through a single broadcast
//! channel. Observers subscribe for display or assertions; emission is
//! best-effort and a missing subscriber drops events silently.

/// Scanner activity events
#[derive(Debug, Clone)]
pub enum ScannerEvent {
    /// The squelch gate opened (a transmission is starting)
    SquelchOpened {
        /// Tuned frequency at the open edge, if the read succeeded
        frequency_hz: Option<u64>,
    },

    /// The squelch gate closed
    SquelchClosed,

    /// The segmenter completed a transmission
    TransmissionRecorded {
        /// Recording length in seconds
        duration_secs: f64,
        /// Tuned frequency the recording was stamped with
        frequency_hz: Option<u64>,
    },

    /// A transmission was transcribed to non-empty text
    TranscriptionReady {
        /// The recognized text
        text: String,
    },

    /// A callsign passed the confidence threshold and was dispatched
    CallsignDetected {
        /// The callsign heard
        callsign: String,
        /// Extraction confidence
        confidence: f32,
    },

    /// A recoverable error occurred
    Error {
        /// Human-readable description
        message: String,
    },
}
