//! Error types for CI-V parsing

use thiserror::Error;

/// Errors produced when validating a complete CI-V frame
#[derive(Debug, Error)]
pub enum ParseError {
    /// Frame is shorter than the 6-byte minimum
    #[error("frame too short: need {needed} more bytes")]
    Incomplete {
        /// Bytes missing to reach the minimum frame length
        needed: usize,
    },

    /// Frame structure is invalid
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
}
