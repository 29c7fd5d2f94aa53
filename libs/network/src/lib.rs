//! Network Infrastructure
//!
//! Identity-addressed multipart messaging over TCP and Unix domain sockets.
//!
//! A [`RouterSocket`] binds an address and tracks every connected peer by the
//! identity it presented during the handshake. A [`DealerSocket`] connects to a
//! router under a fixed identity. Both exchange [`Multipart`] units: ordered
//! frame lists that are always written and read as one piece, so a reader never
//! observes half a unit.
//!
//! Delivery to an identity that is not connected fails immediately with
//! [`TransportError::Unreachable`] rather than queueing. Each connection has a
//! bounded send queue; a peer that stops reading fills its queue and further
//! deliveries to it fail the same way.

pub mod error;
pub mod multipart;
pub mod transports;

// Re-export commonly used types
pub use error::{Result, TransportError};
pub use multipart::Multipart;
pub use transports::{
    DealerSender, DealerSocket, Endpoint, PeerRegistry, RouterSocket, TransportOptions,
};

// Constants for configuration
pub const DEFAULT_ADDRESS: &str = "tcp://127.0.0.1:5555";
pub const DEFAULT_MAX_UNIT_SIZE: usize = 16 * 1024 * 1024; // 16MB
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_SEND_QUEUE: usize = 1_024;
