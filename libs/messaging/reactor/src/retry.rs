//! Bounded retry for undeliverable envelopes
//!
//! Meant to be called from `on_delivery_failure`. Each resend carries the
//! failed attempt count plus one, so a destination that never becomes
//! reachable sees attempts `0..=max_retries` and then the policy gives up.

use crate::handler::{DeliveryFailure, ReactorContext};
use crate::Result;
use fabric_config::ReactorConfig;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Resent with this attempt count
    Resent { attempt: u32 },
    /// Not resent; attempt count of the last failed envelope
    Exhausted { attempts: u32 },
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    pub fn from_config(config: &ReactorConfig) -> Self {
        Self::new(config.max_retries)
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Whether an envelope that failed at `attempts` should be resent
    pub fn should_retry(&self, attempts: u32) -> bool {
        attempts < self.max_retries
    }

    pub fn apply(&self, ctx: &ReactorContext, failure: &DeliveryFailure) -> Result<RetryDecision> {
        if !self.should_retry(failure.attempts()) {
            warn!(
                identity = %ctx.identity(),
                destination = %failure.destination(),
                attempts = failure.attempts(),
                "Giving up on undeliverable envelope"
            );
            return Ok(RetryDecision::Exhausted {
                attempts: failure.attempts(),
            });
        }

        let attempt = failure.retry(ctx)?;
        debug!(
            identity = %ctx.identity(),
            destination = %failure.destination(),
            attempt,
            "Resent undeliverable envelope"
        );
        Ok(RetryDecision::Resent { attempt })
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(fabric_config::defaults::reactor::MAX_RETRIES)
    }
}
