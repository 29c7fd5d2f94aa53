//! Dealer socket
//!
//! Outbound connection that presents a fixed identity to a router.

use super::framing::{ensure_within_limit, read_loop, write_loop, write_unit};
use super::{connect, Endpoint, TransportOptions};
use crate::{Multipart, Result, TransportError};
use bytes::{Bytes, BytesMut};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::{TryRecvError, TrySendError};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Cloneable send half of a [`DealerSocket`]
///
/// Sending only queues the unit for the connection's writer task.
#[derive(Clone, Debug)]
pub struct DealerSender {
    outbound: mpsc::Sender<Multipart>,
    max_unit_size: usize,
}

impl DealerSender {
    /// Fails with [`TransportError::QueueFull`] while the writer is backed up
    pub fn send(&self, unit: Multipart) -> Result<()> {
        ensure_within_limit(&unit, self.max_unit_size)?;
        self.outbound.try_send(unit).map_err(|e| match e {
            TrySendError::Full(_) => TransportError::QueueFull {
                capacity: self.outbound.max_capacity(),
            },
            TrySendError::Closed(_) => TransportError::Disconnected,
        })
    }

    pub fn max_unit_size(&self) -> usize {
        self.max_unit_size
    }

    pub fn is_closed(&self) -> bool {
        self.outbound.is_closed()
    }
}

/// Connected socket with a fixed identity
pub struct DealerSocket {
    identity: Bytes,
    sender: DealerSender,
    inbound: mpsc::Receiver<Multipart>,
    shutdown: CancellationToken,
}

impl DealerSocket {
    /// Connect and send the identity handshake
    pub async fn connect(
        address: &str,
        identity: impl Into<Bytes>,
        options: TransportOptions,
    ) -> Result<Self> {
        let identity = identity.into();
        if identity.is_empty() {
            return Err(TransportError::protocol("identity must not be empty"));
        }

        let endpoint = Endpoint::parse(address)?;
        let timeout_ms = options.connect_timeout.as_millis() as u64;
        let (reader, mut writer) = tokio::time::timeout(options.connect_timeout, connect(&endpoint))
            .await
            .map_err(|_| TransportError::timeout("connect", timeout_ms))?
            .map_err(|source| TransportError::Connect {
                address: address.to_string(),
                source,
            })?;

        let handshake = Multipart::from(vec![identity.clone()]);
        write_unit(
            &mut writer,
            &handshake,
            &mut BytesMut::new(),
            options.max_unit_size,
        )
        .await?;

        let (outbound_tx, outbound_rx) = mpsc::channel(options.queue_capacity());
        let (inbound_tx, inbound) = mpsc::channel(options.queue_capacity());
        let shutdown = CancellationToken::new();

        tokio::spawn(write_loop(
            writer,
            outbound_rx,
            options.max_unit_size,
            shutdown.clone(),
        ));
        tokio::spawn(read_loop(
            reader,
            inbound_tx,
            options.max_unit_size,
            shutdown.clone(),
        ));

        debug!(identity = %hex::encode(&identity), %endpoint, "Dealer connected");

        Ok(Self {
            identity,
            sender: DealerSender {
                outbound: outbound_tx,
                max_unit_size: options.max_unit_size,
            },
            inbound,
            shutdown,
        })
    }

    pub fn identity(&self) -> &Bytes {
        &self.identity
    }

    pub fn sender(&self) -> DealerSender {
        self.sender.clone()
    }

    pub fn send(&self, unit: Multipart) -> Result<()> {
        self.sender.send(unit)
    }

    /// Non-blocking receive
    ///
    /// `Ok(None)` means nothing is pending; `Err(Disconnected)` means the
    /// connection is gone and every buffered unit has been drained.
    pub fn try_recv(&mut self) -> Result<Option<Multipart>> {
        match self.inbound.try_recv() {
            Ok(unit) => Ok(Some(unit)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(TransportError::Disconnected),
        }
    }

    pub async fn recv(&mut self) -> Result<Multipart> {
        self.inbound.recv().await.ok_or(TransportError::Disconnected)
    }

    /// Stop the connection's reader and writer tasks
    pub fn close(&self) {
        self.shutdown.cancel();
    }
}

impl Drop for DealerSocket {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
