//! Transport Error Types
//!
//! Error handling for endpoint parsing, socket setup, framing and
//! identity-addressed delivery.

use thiserror::Error;

/// Main transport error type
#[derive(Error, Debug)]
pub enum TransportError {
    /// Address string is not a supported endpoint
    #[error("Invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// Listener could not be bound (address in use, permission denied, ...)
    #[error("Bind error: {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Outbound connection could not be established
    #[error("Connection error: {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Transport timeout errors
    #[error("Timeout error: {operation} exceeded {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    /// No connected peer owns the identity
    #[error("Peer unreachable: identity 0x{identity}")]
    Unreachable { identity: String },

    /// The connection behind a socket handle has closed
    #[error("Connection closed")]
    Disconnected,

    /// The connection's send queue is at capacity
    #[error("Send queue full: {capacity} units pending")]
    QueueFull { capacity: usize },

    /// Framing violations
    #[error("Protocol error: {message}")]
    Protocol { message: String },

    /// Generic I/O errors
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

impl TransportError {
    /// Create an invalid address error
    pub fn invalid_address(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAddress {
            address: address.into(),
            reason: reason.into(),
        }
    }

    /// Create an unreachable-peer error for a raw identity
    pub fn unreachable(identity: &[u8]) -> Self {
        Self::Unreachable {
            identity: hex::encode(identity),
        }
    }

    /// Create a protocol error
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    /// True when the error means "destination not connected"
    pub fn is_unreachable(&self) -> bool {
        matches!(self, TransportError::Unreachable { .. })
    }

    /// Get error category for metrics
    pub fn category(&self) -> &'static str {
        match self {
            TransportError::InvalidAddress { .. } => "invalid_address",
            TransportError::Bind { .. } => "bind",
            TransportError::Connect { .. } => "connect",
            TransportError::Timeout { .. } => "timeout",
            TransportError::Unreachable { .. } => "unreachable",
            TransportError::Disconnected => "disconnected",
            TransportError::QueueFull { .. } => "queue_full",
            TransportError::Protocol { .. } => "protocol",
            TransportError::Io { .. } => "io",
        }
    }
}

/// Convert standard I/O errors to transport errors
impl From<std::io::Error> for TransportError {
    fn from(error: std::io::Error) -> Self {
        TransportError::Io {
            message: error.to_string(),
            source: error,
        }
    }
}
