//! Audio capture capability
//!
//! The scanner depends only on this abstract surface; the OS-specific cpal
//! backend lives in its own crate. Chunks are produced by the capture
//! callback and drained by the control loop, one per poll tick.

use chrono::{DateTime, Utc};

use crate::error::AudioSourceError;

/// Chunks buffered between the capture callback and the control loop;
/// overflow drops the oldest chunk
pub const AUDIO_QUEUE_CAPACITY: usize = 100;

/// A contiguous block of mono samples from the capture device
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// Mono samples in [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Capture sample rate in Hz
    pub sample_rate: u32,
    /// Wall-clock time the chunk was emitted
    pub timestamp: DateTime<Utc>,
}

impl AudioChunk {
    /// Create a chunk stamped with the current wall-clock time
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
            timestamp: Utc::now(),
        }
    }
}

/// An audio capture backend delivering mono float chunks.
///
/// Implementations buffer internally with drop-oldest semantics; the capture
/// callback must never block.
pub trait AudioSource: Send {
    /// Begin capturing. Fails when no usable input device exists.
    fn start(&mut self) -> Result<(), AudioSourceError>;

    /// Stop capturing and release the device
    fn stop(&mut self);

    /// True while the backend is delivering chunks
    fn is_capturing(&self) -> bool;

    /// Drain one buffered chunk without waiting
    fn try_next_chunk(&mut self) -> Option<AudioChunk>;
}
