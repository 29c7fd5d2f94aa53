//! # Reactor Error Types

use codec::ReactorId;
use network::TransportError;
use thiserror::Error;

/// Reactor operation errors
#[derive(Error, Debug)]
pub enum ReactorError {
    /// The node never connected, or has been stopped
    #[error("Reactor {identity} is not connected")]
    NotConnected { identity: ReactorId },

    /// The envelope would not leave room for a failure notice
    #[error("Envelope of {size} bytes exceeds the {limit} byte send limit")]
    PayloadTooLarge { size: usize, limit: usize },

    /// The transport refused the unit
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Result type alias for reactor operations
pub type Result<T> = std::result::Result<T, ReactorError>;
