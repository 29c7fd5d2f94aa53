//! Codec errors
//!
//! Every decode failure is reported explicitly so that callers can skip the
//! unit instead of acting on a placeholder value.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A fixed-width frame had the wrong length
    #[error("Invalid {field} frame: expected {expected} bytes, got {got}")]
    InvalidWidth {
        field: &'static str,
        expected: usize,
        got: usize,
    },

    /// The unit had the wrong number of frames for its kind
    #[error("Unexpected frame count for {context}: expected {expected}, got {got}")]
    FrameCount {
        context: &'static str,
        expected: usize,
        got: usize,
    },

    /// A failure notice did not start with the reserved marker
    #[error("Missing failure marker")]
    MissingMarker,
}

pub type Result<T> = std::result::Result<T, CodecError>;
