//! Protocol error types.

use thiserror::Error;

/// Errors that can occur when parsing or building Souliss frames.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Frame carries no functional code.
    #[error("empty frame")]
    EmptyFrame,

    /// Frame is too short for the field being read.
    #[error("frame too short: expected at least {expected} bytes, got {actual}")]
    FrameTooShort {
        /// Expected minimum length.
        expected: usize,
        /// Actual length received.
        actual: usize,
    },

    /// Action message announces a value width other than 1 or 2.
    #[error("unsupported action value width: {0}")]
    UnsupportedWidth(u8),

    /// Request payload does not fit in a single frame.
    #[error("payload too large: maximum {max} bytes, got {actual}")]
    PayloadTooLarge {
        /// Maximum allowed length.
        max: usize,
        /// Actual length requested.
        actual: usize,
    },
}

impl ProtocolError {
    /// Create a length error for a read that needed `expected` bytes.
    pub fn too_short(expected: usize, actual: usize) -> Self {
        ProtocolError::FrameTooShort { expected, actual }
    }
}

/// Result type alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;
