//! Router socket
//!
//! Accepts connections, registers each under the identity sent in its first
//! unit, and tags every inbound unit with the sender identity as frame 0.

use super::framing::{ensure_within_limit, read_unit, write_loop};
use super::{BoxedReader, BoxedWriter, Endpoint, Listener, TransportOptions};
use crate::{Multipart, Result, TransportError};
use bytes::Bytes;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

struct Peer {
    connection_id: u64,
    outbound: mpsc::Sender<Multipart>,
}

/// Connected peers keyed by handshake identity
#[derive(Clone, Default)]
pub struct PeerRegistry {
    peers: Arc<DashMap<Bytes, Peer>>,
}

impl PeerRegistry {
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn contains(&self, identity: &[u8]) -> bool {
        self.peers.contains_key(identity)
    }

    /// Returns false if the identity is already taken
    fn register(&self, identity: Bytes, peer: Peer) -> bool {
        match self.peers.entry(identity) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(peer);
                true
            }
        }
    }

    fn deregister(&self, identity: &[u8], connection_id: u64) {
        self.peers
            .remove_if(identity, |_, peer| peer.connection_id == connection_id);
    }

    /// A peer whose send queue is full counts as unreachable
    fn deliver(&self, identity: &[u8], unit: Multipart) -> Result<()> {
        let peer = self
            .peers
            .get(identity)
            .ok_or_else(|| TransportError::unreachable(identity))?;
        match peer.outbound.try_send(unit) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                debug!(identity = %hex::encode(identity), "Peer send queue full");
                Err(TransportError::unreachable(identity))
            }
            Err(TrySendError::Closed(_)) => Err(TransportError::unreachable(identity)),
        }
    }
}

/// Bound, identity-addressed socket
///
/// Must be driven from a single task; `try_recv`/`recv` take `&mut self`.
pub struct RouterSocket {
    local_addr: String,
    options: TransportOptions,
    registry: PeerRegistry,
    inbound: mpsc::Receiver<Multipart>,
    shutdown: CancellationToken,
}

impl RouterSocket {
    /// Bind the address and start accepting peers
    pub async fn bind(address: &str, options: TransportOptions) -> Result<Self> {
        let endpoint = Endpoint::parse(address)?;
        let (listener, local_addr) =
            Listener::bind(&endpoint)
                .await
                .map_err(|source| TransportError::Bind {
                    address: address.to_string(),
                    source,
                })?;

        let registry = PeerRegistry::default();
        let (inbound_tx, inbound) = mpsc::channel(options.queue_capacity());
        let shutdown = CancellationToken::new();

        tokio::spawn(accept_loop(
            listener,
            registry.clone(),
            inbound_tx,
            options,
            shutdown.clone(),
        ));

        info!(%local_addr, "Router socket listening");

        Ok(Self {
            local_addr,
            options,
            registry,
            inbound,
            shutdown,
        })
    }

    /// Resolved bound address, e.g. the real port for `tcp://127.0.0.1:0`
    pub fn local_addr(&self) -> &str {
        &self.local_addr
    }

    pub fn registry(&self) -> PeerRegistry {
        self.registry.clone()
    }

    /// Next unit if one is pending; frame 0 is the sender identity
    pub fn try_recv(&mut self) -> Option<Multipart> {
        self.inbound.try_recv().ok()
    }

    pub async fn recv(&mut self) -> Option<Multipart> {
        self.inbound.recv().await
    }

    /// Queue a unit for the peer with `identity`
    ///
    /// Fails with [`TransportError::Unreachable`] if no such peer is connected
    /// or its send queue is full.
    pub fn send(&self, identity: &[u8], unit: Multipart) -> Result<()> {
        ensure_within_limit(&unit, self.options.max_unit_size)?;
        self.registry.deliver(identity, unit)
    }
}

impl Drop for RouterSocket {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn accept_loop(
    listener: Listener,
    registry: PeerRegistry,
    inbound: mpsc::Sender<Multipart>,
    options: TransportOptions,
    shutdown: CancellationToken,
) {
    let mut next_connection_id = 0u64;
    loop {
        let accepted = tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => accepted,
        };

        match accepted {
            Ok((reader, writer, peer)) => {
                next_connection_id += 1;
                debug!(connection_id = next_connection_id, %peer, "Accepted connection");
                tokio::spawn(serve_peer(
                    reader,
                    writer,
                    next_connection_id,
                    registry.clone(),
                    inbound.clone(),
                    options,
                    shutdown.child_token(),
                ));
            }
            Err(e) => {
                warn!(error = %e, "Failed to accept connection");
            }
        }
    }
    debug!("Router accept loop stopped");
}

fn identity_from_handshake(mut unit: Multipart) -> Option<Bytes> {
    if unit.len() != 1 {
        return None;
    }
    unit.pop_front().filter(|identity| !identity.is_empty())
}

async fn serve_peer(
    mut reader: BoxedReader,
    writer: BoxedWriter,
    connection_id: u64,
    registry: PeerRegistry,
    inbound: mpsc::Sender<Multipart>,
    options: TransportOptions,
    shutdown: CancellationToken,
) {
    let handshake = tokio::select! {
        _ = shutdown.cancelled() => return,
        unit = read_unit(&mut reader, options.max_unit_size) => unit,
    };

    let identity = match handshake {
        Ok(Some(unit)) => match identity_from_handshake(unit) {
            Some(identity) => identity,
            None => {
                warn!(connection_id, "Rejecting connection: malformed identity handshake");
                return;
            }
        },
        Ok(None) => {
            debug!(connection_id, "Connection closed before handshake");
            return;
        }
        Err(e) => {
            warn!(connection_id, error = %e, "Handshake failed");
            return;
        }
    };
    let label = hex::encode(&identity);

    let (outbound_tx, outbound_rx) = mpsc::channel(options.queue_capacity());
    let peer = Peer {
        connection_id,
        outbound: outbound_tx,
    };
    if !registry.register(identity.clone(), peer) {
        warn!(identity = %label, connection_id, "Rejecting duplicate identity");
        return;
    }
    info!(identity = %label, connection_id, "Peer registered");

    let writer_task = tokio::spawn(write_loop(
        writer,
        outbound_rx,
        options.max_unit_size,
        shutdown.clone(),
    ));

    loop {
        let unit = tokio::select! {
            _ = shutdown.cancelled() => break,
            unit = read_unit(&mut reader, options.max_unit_size) => unit,
        };

        match unit {
            Ok(Some(mut unit)) => {
                unit.push_front(identity.clone());
                let forwarded = tokio::select! {
                    _ = shutdown.cancelled() => break,
                    sent = inbound.send(unit) => sent,
                };
                if forwarded.is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!(identity = %label, error = %e, "Read failed, dropping peer");
                break;
            }
        }
    }

    registry.deregister(&identity, connection_id);
    shutdown.cancel();
    let _ = writer_task.await;
    info!(identity = %label, connection_id, "Peer disconnected");
}
