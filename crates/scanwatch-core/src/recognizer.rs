//! Speech recognition capability
//!
//! The trait is synchronous: decoding is CPU-bound work the scanner drives
//! through `spawn_blocking`. Implementations serialize decoding internally —
//! the scanner assumes `transcribe` may be called from any task but never
//! runs two decodes concurrently through one recognizer.

use std::path::Path;
use std::time::Duration;

use crate::error::RecognizerError;

/// Result of transcribing one audio segment
#[derive(Debug, Clone, Default)]
pub struct Transcription {
    /// Recognized text; empty when nothing was recognized
    pub text: String,
    /// Recognizer confidence in [0, 1]
    pub confidence: f32,
    /// Time spent decoding
    pub duration: Duration,
}

impl Transcription {
    /// True when no usable text was recognized
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// An offline speech recognizer expecting 16 kHz mono float samples
pub trait Recognizer: Send + Sync {
    /// True once the model is loaded and decoding can proceed
    fn is_ready(&self) -> bool;

    /// Load the model. Returns false on failure; the pipeline keeps running
    /// and transcriptions come back empty until a later attempt succeeds.
    fn initialize(&self) -> bool;

    /// Transcribe mono samples at 16 kHz
    fn transcribe(&self, samples: &[f32]) -> Result<Transcription, RecognizerError>;

    /// Transcribe an uncompressed linear-PCM WAV file
    fn transcribe_file(&self, path: &Path) -> Result<Transcription, RecognizerError>;
}
