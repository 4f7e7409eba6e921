//! Realtime engine metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Engine-level metrics counters.
#[derive(Debug, Default)]
pub struct RealtimeMetrics {
    /// Total connections established
    connections_opened: AtomicU64,
    /// Total connections closed
    connections_closed: AtomicU64,
    /// Total inbound frames received
    messages_received: AtomicU64,
    /// Total inbound frames dropped as malformed
    messages_malformed: AtomicU64,
    /// Total outbound messages queued
    messages_sent: AtomicU64,
    /// Total outbound messages that could not be queued
    delivery_failures: AtomicU64,
}

impl RealtimeMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new connection
    pub fn connection_opened(&self) {
        self.connections_opened.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a closed connection
    pub fn connection_closed(&self) {
        self.connections_closed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an inbound frame
    pub fn message_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a dropped inbound frame
    pub fn message_malformed(&self) {
        self.messages_malformed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an outbound delivery attempt
    pub fn delivery(&self, delivered: bool) {
        if delivered {
            self.messages_sent.fetch_add(1, Ordering::Relaxed);
        } else {
            self.delivery_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        let opened = self.connections_opened.load(Ordering::Relaxed);
        let closed = self.connections_closed.load(Ordering::Relaxed);
        MetricsSnapshot {
            connections_total: opened,
            connections_active: opened.saturating_sub(closed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_malformed: self.messages_malformed.load(Ordering::Relaxed),
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            delivery_failures: self.delivery_failures.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Total connections ever established
    pub connections_total: u64,
    /// Currently open connections
    pub connections_active: u64,
    /// Total inbound frames
    pub messages_received: u64,
    /// Inbound frames dropped as malformed
    pub messages_malformed: u64,
    /// Outbound messages queued
    pub messages_sent: u64,
    /// Outbound messages dropped
    pub delivery_failures: u64,
}
