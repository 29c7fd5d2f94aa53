//! # Router Engine
//!
//! Owns one bound [`RouterSocket`] and runs the forwarding loop on a dedicated
//! task. Each received unit is handled exactly once: forwarded, turned into a
//! failure notice for its sender, or dropped as malformed.

use crate::metrics::{RouterMetrics, RouterMetricsSnapshot};
use crate::{Result, RouterError};
use codec::{ReactorId, RoutedUnit};
use fabric_config::{RouterConfig, TransportSettings};
use network::{Multipart, PeerRegistry, RouterSocket, TransportError};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// What happened to one received unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouteOutcome {
    Forwarded,
    SenderNotified,
    Undeliverable,
    Malformed,
}

pub struct Router {
    address: String,
    socket: Option<RouterSocket>,
    bind_error: Option<TransportError>,
    idle_backoff: Duration,
    metrics: Arc<RouterMetrics>,
}

impl Router {
    /// Bind the configured address
    ///
    /// Never fails: a bind error is recorded and reported through
    /// [`binding_failed`](Self::binding_failed). It is not retried.
    pub async fn bind(config: &RouterConfig, transport: &TransportSettings) -> Self {
        let (socket, bind_error) =
            match RouterSocket::bind(&config.address, transport.options()).await {
                Ok(socket) => {
                    info!(address = %config.address, local_addr = %socket.local_addr(), "Router bound");
                    (Some(socket), None)
                }
                Err(e) => {
                    if config.log_bind_failure {
                        warn!(address = %config.address, error = %e, "Router failed to bind");
                    } else {
                        debug!(address = %config.address, error = %e, "Router failed to bind");
                    }
                    (None, Some(e))
                }
            };

        Self {
            address: config.address.clone(),
            socket,
            bind_error,
            idle_backoff: config.idle_backoff(),
            metrics: Arc::new(RouterMetrics::default()),
        }
    }

    pub fn binding_failed(&self) -> bool {
        self.socket.is_none()
    }

    pub fn bind_error(&self) -> Option<&TransportError> {
        self.bind_error.as_ref()
    }

    /// Configured address
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Resolved bound address, `None` if binding failed
    pub fn local_addr(&self) -> Option<&str> {
        self.socket.as_ref().map(RouterSocket::local_addr)
    }

    /// Currently connected reactors
    pub fn peers(&self) -> Option<PeerRegistry> {
        self.socket.as_ref().map(RouterSocket::registry)
    }

    pub fn metrics(&self) -> RouterMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Shared counters, still readable after the router moves into a task
    pub fn metrics_handle(&self) -> Arc<RouterMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Forwarding loop; returns once `shutdown` is cancelled
    pub async fn run(&mut self, shutdown: CancellationToken) -> Result<()> {
        let socket = self.socket.as_mut().ok_or_else(|| RouterError::NotBound {
            address: self.address.clone(),
        })?;

        info!(local_addr = %socket.local_addr(), "Router forwarding loop started");
        while !shutdown.is_cancelled() {
            match socket.try_recv() {
                Some(unit) => {
                    route(socket, unit, &self.metrics);
                }
                None => {
                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        _ = tokio::time::sleep(self.idle_backoff) => {}
                    }
                }
            }
        }

        info!(local_addr = %socket.local_addr(), "Router forwarding loop stopped");
        Ok(())
    }

    /// Run on a dedicated task
    pub fn spawn(mut self, shutdown: CancellationToken) -> JoinHandle<Result<()>> {
        tokio::spawn(async move { self.run(shutdown).await })
    }
}

fn route(socket: &RouterSocket, unit: Multipart, metrics: &RouterMetrics) -> RouteOutcome {
    metrics.record_received();

    let routed = match RoutedUnit::split(unit) {
        Ok(routed) => routed,
        Err(e) => {
            warn!(error = %e, "Dropping malformed unit");
            metrics.record_malformed();
            return RouteOutcome::Malformed;
        }
    };

    let error = match socket.send(&routed.destination, routed.delivery()) {
        Ok(()) => {
            debug!(
                sender = %label(&routed.sender),
                destination = %label(&routed.destination),
                "Forwarded unit"
            );
            metrics.record_forwarded();
            return RouteOutcome::Forwarded;
        }
        Err(e) => e,
    };

    warn!(
        sender = %label(&routed.sender),
        destination = %label(&routed.destination),
        error = %error,
        "Delivery failed, notifying sender"
    );

    let sender = routed.sender.clone();
    match socket.send(&sender, routed.into_failure_notice()) {
        Ok(()) => {
            metrics.record_failure_notice();
            RouteOutcome::SenderNotified
        }
        Err(e) => {
            warn!(sender = %label(&sender), error = %e, "Failure notice undeliverable");
            metrics.record_undeliverable_notice();
            RouteOutcome::Undeliverable
        }
    }
}

/// Reactor identities print as numbers, anything else as hex
fn label(frame: &[u8]) -> String {
    ReactorId::from_frame(frame)
        .map(|id| id.to_string())
        .unwrap_or_else(|_| hex::encode(frame))
}
