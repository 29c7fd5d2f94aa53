//! Reactor counters

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct ReactorMetrics {
    sent: AtomicU64,
    resent: AtomicU64,
    messages: AtomicU64,
    delivery_failures: AtomicU64,
    malformed: AtomicU64,
}

/// Point-in-time copy of [`ReactorMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReactorMetricsSnapshot {
    /// Envelopes sent with attempt count 0
    pub sent: u64,
    /// Envelopes resent from a failure hook
    pub resent: u64,
    /// Payloads dispatched to `on_message`
    pub messages: u64,
    /// Notices dispatched to `on_delivery_failure`
    pub delivery_failures: u64,
    /// Units skipped because they could not be decoded
    pub malformed: u64,
}

impl ReactorMetrics {
    #[inline]
    pub(crate) fn record_sent(&self) {
        self.sent.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_resent(&self) {
        self.resent.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_message(&self) {
        self.messages.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_delivery_failure(&self) {
        self.delivery_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_malformed(&self) {
        self.malformed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ReactorMetricsSnapshot {
        ReactorMetricsSnapshot {
            sent: self.sent.load(Ordering::Relaxed),
            resent: self.resent.load(Ordering::Relaxed),
            messages: self.messages.load(Ordering::Relaxed),
            delivery_failures: self.delivery_failures.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
        }
    }
}
