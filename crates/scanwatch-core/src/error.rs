//! Error types for the scan monitor core

use thiserror::Error;

/// Errors from the radio client
#[derive(Debug, Error)]
pub enum RadioError {
    /// The serial port could not be opened
    #[error("serial port unavailable: {0}")]
    Serial(#[from] tokio_serial::Error),

    /// I/O error on the open port
    #[error("serial I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from an audio capture backend
#[derive(Debug, Error)]
pub enum AudioSourceError {
    /// No input device matched the configuration
    #[error("no audio input device found: {0}")]
    NoDevice(String),

    /// The backend failed to build or start its stream
    #[error("audio stream error: {0}")]
    Stream(String),
}

/// Errors from a speech recognizer
#[derive(Debug, Error)]
pub enum RecognizerError {
    /// The model could not be loaded
    #[error("model load failed: {0}")]
    ModelLoad(String),

    /// Decoding failed
    #[error("transcription failed: {0}")]
    Decode(String),

    /// An audio file could not be read
    #[error("audio file error: {0}")]
    File(#[from] std::io::Error),
}

/// Top-level errors from the scanner coordinator
#[derive(Debug, Error)]
pub enum ScannerError {
    /// Radio client error during startup
    #[error(transparent)]
    Radio(#[from] RadioError),

    /// Audio capture error during startup
    #[error(transparent)]
    Audio(#[from] AudioSourceError),
}
