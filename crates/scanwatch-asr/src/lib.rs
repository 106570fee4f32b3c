//! Offline speech recognition for the scan monitor
//!
//! Wraps `whisper_rs` behind the core [`Recognizer`] capability. The GGML
//! model loads lazily on first use and is reused for every transcription;
//! decoding is serialized internally because the model is not reentrant.
//!
//! [`Recognizer`]: scanwatch_core::Recognizer

pub mod wav;
mod whisper;

pub use whisper::{AsrConfig, WhisperRecognizer};
