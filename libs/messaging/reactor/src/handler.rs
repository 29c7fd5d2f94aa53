//! Handler extension point
//!
//! A [`ReactorHandler`] receives every payload and every delivery failure for
//! one node. Both hooks run on the node's receive task, one at a time, and get
//! a [`ReactorContext`] for sending from inside the hook.

use crate::metrics::ReactorMetrics;
use crate::{ReactorError, Result};
use bytes::Bytes;
use codec::{Envelope, FailureNotice, ReactorId, NOTICE_OVERHEAD};
use network::DealerSender;
use std::sync::Arc;

pub trait ReactorHandler: Send + 'static {
    fn on_message(&mut self, ctx: &ReactorContext, payload: Bytes);

    fn on_delivery_failure(&mut self, ctx: &ReactorContext, failure: DeliveryFailure);
}

/// Build a handler from two closures
pub fn handler_fn<M, F>(on_message: M, on_delivery_failure: F) -> FnHandler<M, F>
where
    M: FnMut(&ReactorContext, Bytes) + Send + 'static,
    F: FnMut(&ReactorContext, DeliveryFailure) + Send + 'static,
{
    FnHandler {
        on_message,
        on_delivery_failure,
    }
}

pub struct FnHandler<M, F> {
    on_message: M,
    on_delivery_failure: F,
}

impl<M, F> ReactorHandler for FnHandler<M, F>
where
    M: FnMut(&ReactorContext, Bytes) + Send + 'static,
    F: FnMut(&ReactorContext, DeliveryFailure) + Send + 'static,
{
    fn on_message(&mut self, ctx: &ReactorContext, payload: Bytes) {
        (self.on_message)(ctx, payload)
    }

    fn on_delivery_failure(&mut self, ctx: &ReactorContext, failure: DeliveryFailure) {
        (self.on_delivery_failure)(ctx, failure)
    }
}

/// Sending side of a connected node
#[derive(Clone, Debug)]
pub struct ReactorContext {
    identity: ReactorId,
    sender: DealerSender,
    metrics: Arc<ReactorMetrics>,
}

impl ReactorContext {
    pub(crate) fn new(identity: ReactorId, sender: DealerSender, metrics: Arc<ReactorMetrics>) -> Self {
        Self {
            identity,
            sender,
            metrics,
        }
    }

    pub fn identity(&self) -> ReactorId {
        self.identity
    }

    /// Send `payload` to `destination` as a first attempt
    ///
    /// Fails with [`ReactorError::PayloadTooLarge`] unless the envelope plus
    /// [`NOTICE_OVERHEAD`] fits the transport's unit limit.
    pub fn send(&self, destination: ReactorId, payload: impl Into<Bytes>) -> Result<()> {
        self.transmit(Envelope::new(destination, payload))?;
        self.metrics.record_sent();
        Ok(())
    }

    /// Largest envelope whose failure notice still fits one unit
    pub fn send_limit(&self) -> usize {
        self.sender.max_unit_size().saturating_sub(NOTICE_OVERHEAD)
    }

    pub(crate) fn metrics(&self) -> &ReactorMetrics {
        &self.metrics
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    fn resend(&self, envelope: Envelope) -> Result<()> {
        self.transmit(envelope)?;
        self.metrics.record_resent();
        Ok(())
    }

    fn transmit(&self, envelope: Envelope) -> Result<()> {
        let unit = envelope.into_multipart();
        let size = unit.encoded_len();
        let limit = self.send_limit();
        if size > limit {
            return Err(ReactorError::PayloadTooLarge { size, limit });
        }
        self.sender.send(unit)?;
        Ok(())
    }
}

/// An envelope the router could not deliver
///
/// Only the receive loop creates these, so resending is only possible from
/// inside `on_delivery_failure`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFailure {
    destination: ReactorId,
    attempts: u32,
    payload: Bytes,
}

impl DeliveryFailure {
    pub(crate) fn from_notice(notice: FailureNotice) -> Self {
        Self {
            destination: notice.destination,
            attempts: notice.attempts,
            payload: notice.payload,
        }
    }

    pub fn destination(&self) -> ReactorId {
        self.destination
    }

    /// Attempt count of the envelope that failed
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Resend the original payload with an explicit attempt count
    pub fn resend(&self, ctx: &ReactorContext, attempts: u32) -> Result<()> {
        ctx.resend(Envelope::with_attempts(
            self.destination,
            attempts,
            self.payload.clone(),
        ))
    }

    /// Resend with the attempt count incremented, returning the new count
    pub fn retry(&self, ctx: &ReactorContext) -> Result<u32> {
        let next = self.attempts.saturating_add(1);
        self.resend(ctx, next)?;
        Ok(next)
    }
}
