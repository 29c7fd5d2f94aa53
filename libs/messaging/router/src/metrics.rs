//! Router counters
//!
//! Updated from the forwarding task, read from anywhere through a snapshot.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct RouterMetrics {
    received: AtomicU64,
    forwarded: AtomicU64,
    failure_notices: AtomicU64,
    undeliverable_notices: AtomicU64,
    malformed: AtomicU64,
}

/// Point-in-time copy of [`RouterMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouterMetricsSnapshot {
    pub received: u64,
    pub forwarded: u64,
    /// Failure notices delivered back to a sender
    pub failure_notices: u64,
    /// Failure notices that could not reach the sender either
    pub undeliverable_notices: u64,
    pub malformed: u64,
}

impl RouterMetrics {
    #[inline]
    pub(crate) fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_forwarded(&self) {
        self.forwarded.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_failure_notice(&self) {
        self.failure_notices.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_undeliverable_notice(&self) {
        self.undeliverable_notices.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_malformed(&self) {
        self.malformed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RouterMetricsSnapshot {
        RouterMetricsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            forwarded: self.forwarded.load(Ordering::Relaxed),
            failure_notices: self.failure_notices.load(Ordering::Relaxed),
            undeliverable_notices: self.undeliverable_notices.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
        }
    }
}
