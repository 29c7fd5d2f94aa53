//! Unified Transport Layer
//!
//! Endpoint parsing plus the two socket roles of the fabric:
//! - [`RouterSocket`]: binds, tracks peers by handshake identity, delivers by identity
//! - [`DealerSocket`]: connects under a fixed identity, sends and receives units
//!
//! TCP and Unix domain sockets are both supported; the rest of the crate only
//! sees boxed reader/writer halves.

use crate::{
    Result, TransportError, DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_MAX_UNIT_SIZE, DEFAULT_SEND_QUEUE,
};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};

mod dealer;
mod framing;
mod router;
mod tcp;
mod unix;


pub use dealer::{DealerSender, DealerSocket};
pub use router::{PeerRegistry, RouterSocket};

pub(crate) type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
pub(crate) type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// A parsed transport address
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `tcp://host:port`
    Tcp(String),
    /// `ipc://<path>`, a Unix domain socket
    Ipc(PathBuf),
}

impl Endpoint {
    /// Parse a `tcp://` or `ipc://` address
    pub fn parse(address: &str) -> Result<Self> {
        if let Some(host_port) = address.strip_prefix("tcp://") {
            if host_port.is_empty() || !host_port.contains(':') {
                return Err(TransportError::invalid_address(
                    address,
                    "expected tcp://host:port",
                ));
            }
            return Ok(Endpoint::Tcp(host_port.to_string()));
        }

        if let Some(path) = address.strip_prefix("ipc://") {
            if path.is_empty() {
                return Err(TransportError::invalid_address(
                    address,
                    "expected ipc://<socket path>",
                ));
            }
            return Ok(Endpoint::Ipc(PathBuf::from(path)));
        }

        Err(TransportError::invalid_address(
            address,
            "unsupported scheme, expected tcp:// or ipc://",
        ))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Tcp(host_port) => write!(f, "tcp://{}", host_port),
            Endpoint::Ipc(path) => write!(f, "ipc://{}", path.display()),
        }
    }
}

/// Limits applied to every socket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportOptions {
    /// Largest unit accepted or sent, including framing overhead
    pub max_unit_size: usize,
    /// Upper bound on establishing an outbound connection
    pub connect_timeout: Duration,
    /// Units queued per connection before sends to it start failing
    pub send_queue: usize,
}

impl TransportOptions {
    pub fn new(max_unit_size: usize, connect_timeout: Duration) -> Self {
        Self {
            max_unit_size,
            connect_timeout,
            send_queue: DEFAULT_SEND_QUEUE,
        }
    }

    pub fn with_send_queue(mut self, send_queue: usize) -> Self {
        self.send_queue = send_queue;
        self
    }

    /// Channel capacity; tokio channels cannot be zero-sized
    pub(crate) fn queue_capacity(&self) -> usize {
        self.send_queue.max(1)
    }
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_UNIT_SIZE,
            Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
        )
    }
}

/// A bound listener of either flavour
pub(crate) enum Listener {
    Tcp(tokio::net::TcpListener),
    Unix(unix::UnixBinding),
}

impl Listener {
    /// Bind and report the resolved local address in endpoint form
    pub(crate) async fn bind(endpoint: &Endpoint) -> std::io::Result<(Self, String)> {
        match endpoint {
            Endpoint::Tcp(host_port) => {
                let (listener, local) = tcp::bind(host_port).await?;
                Ok((Listener::Tcp(listener), format!("tcp://{}", local)))
            }
            Endpoint::Ipc(path) => {
                let binding = unix::UnixBinding::bind(path).await?;
                Ok((Listener::Unix(binding), endpoint.to_string()))
            }
        }
    }

    /// Accept one connection, returning its halves and a printable peer label
    pub(crate) async fn accept(&self) -> std::io::Result<(BoxedReader, BoxedWriter, String)> {
        match self {
            Listener::Tcp(listener) => tcp::accept(listener).await,
            Listener::Unix(binding) => binding.accept().await,
        }
    }
}

/// Open an outbound connection to an endpoint
pub(crate) async fn connect(endpoint: &Endpoint) -> std::io::Result<(BoxedReader, BoxedWriter)> {
    match endpoint {
        Endpoint::Tcp(host_port) => tcp::connect(host_port).await,
        Endpoint::Ipc(path) => unix::connect(path).await,
    }
}
