//! # Reactor Node
//!
//! One connection to the router under a fixed identity, plus a receive task
//! that classifies each inbound unit and hands it to the node's handler.
//!
//! ## Lifecycle
//! - `connect` dials eagerly. On failure the error is logged and the node is
//!   left non-functional; there is no reconnection.
//! - `stop` cancels the receive task, releases the connection and waits a
//!   bounded time for the task to exit. Calling it again does nothing.

use crate::handler::{DeliveryFailure, ReactorContext, ReactorHandler};
use crate::metrics::{ReactorMetrics, ReactorMetricsSnapshot};
use crate::{ReactorError, Result};
use bytes::Bytes;
use codec::{Inbound, ReactorId};
use fabric_config::{ReactorConfig, TransportSettings};
use network::{DealerSocket, Multipart};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub struct ReactorNode {
    identity: ReactorId,
    address: String,
    context: Option<ReactorContext>,
    worker: Option<JoinHandle<()>>,
    shutdown: CancellationToken,
    stop_timeout: Duration,
    metrics: Arc<ReactorMetrics>,
}

impl ReactorNode {
    /// Connect to the router at `config.address` and start the receive task
    pub async fn connect<H: ReactorHandler>(
        identity: ReactorId,
        config: &ReactorConfig,
        transport: &TransportSettings,
        handler: H,
    ) -> Self {
        let shutdown = CancellationToken::new();
        let metrics = Arc::new(ReactorMetrics::default());

        let (context, worker) =
            match DealerSocket::connect(&config.address, identity.to_frame(), transport.options())
                .await
            {
                Ok(socket) => {
                    info!(identity = %identity, address = %config.address, "Reactor connected");
                    let context = ReactorContext::new(identity, socket.sender(), Arc::clone(&metrics));
                    let worker = tokio::spawn(receive_loop(
                        socket,
                        handler,
                        context.clone(),
                        config.idle_backoff(),
                        shutdown.clone(),
                    ));
                    (Some(context), Some(worker))
                }
                Err(e) => {
                    error!(
                        identity = %identity,
                        address = %config.address,
                        error = %e,
                        "Reactor failed to connect"
                    );
                    (None, None)
                }
            };

        Self {
            identity,
            address: config.address.clone(),
            context,
            worker,
            shutdown,
            stop_timeout: config.stop_timeout(),
            metrics,
        }
    }

    pub fn identity(&self) -> ReactorId {
        self.identity
    }

    /// Router address this node was configured with
    pub fn address(&self) -> &str {
        &self.address
    }

    /// False if connect failed, the router went away, or the node was stopped
    pub fn is_connected(&self) -> bool {
        self.context.as_ref().is_some_and(|ctx| !ctx.is_closed())
    }

    pub fn metrics(&self) -> ReactorMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Send `payload` to `destination` as a first attempt
    pub fn send(&self, destination: ReactorId, payload: impl Into<Bytes>) -> Result<()> {
        self.context
            .as_ref()
            .ok_or(ReactorError::NotConnected {
                identity: self.identity,
            })?
            .send(destination, payload)
    }

    pub async fn stop(&mut self) {
        self.shutdown.cancel();
        self.context = None;

        let Some(worker) = self.worker.take() else {
            return;
        };

        let abort = worker.abort_handle();
        match tokio::time::timeout(self.stop_timeout, worker).await {
            Ok(Ok(())) => info!(identity = %self.identity, "Reactor stopped"),
            Ok(Err(e)) => warn!(identity = %self.identity, error = %e, "Reactor task ended abnormally"),
            Err(_) => {
                warn!(
                    identity = %self.identity,
                    timeout_ms = self.stop_timeout.as_millis() as u64,
                    "Reactor task did not stop in time, aborting"
                );
                abort.abort();
            }
        }
    }
}

impl Drop for ReactorNode {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn receive_loop<H: ReactorHandler>(
    mut socket: DealerSocket,
    mut handler: H,
    ctx: ReactorContext,
    idle_backoff: Duration,
    shutdown: CancellationToken,
) {
    while !shutdown.is_cancelled() {
        match socket.try_recv() {
            Ok(Some(unit)) => dispatch(&mut handler, &ctx, unit),
            Ok(None) => {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = tokio::time::sleep(idle_backoff) => {}
                }
            }
            Err(e) => {
                warn!(identity = %ctx.identity(), error = %e, "Lost connection to router");
                break;
            }
        }
    }

    socket.close();
    debug!(identity = %ctx.identity(), "Receive loop stopped");
}

fn dispatch<H: ReactorHandler>(handler: &mut H, ctx: &ReactorContext, unit: Multipart) {
    match Inbound::classify(unit) {
        Ok(Inbound::Message(payload)) => {
            ctx.metrics().record_message();
            handler.on_message(ctx, payload);
        }
        Ok(Inbound::Failure(notice)) => {
            debug!(
                identity = %ctx.identity(),
                destination = %notice.destination,
                attempts = notice.attempts,
                "Delivery failed"
            );
            ctx.metrics().record_delivery_failure();
            handler.on_delivery_failure(ctx, DeliveryFailure::from_notice(notice));
        }
        Err(e) => {
            ctx.metrics().record_malformed();
            warn!(identity = %ctx.identity(), error = %e, "Skipping undecodable unit");
        }
    }
}
