//! Response DTOs.

use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process is serving.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Open WebSocket connections.
    pub connections: usize,
    /// Resident doctor records.
    pub doctors: usize,
    /// Connections accepted since start.
    pub connections_total: u64,
    /// Connections opened and not yet closed, per the metrics counters.
    pub connections_active: u64,
    /// Outbound messages queued since start.
    pub messages_sent: u64,
    /// Inbound frames received since start.
    pub messages_received: u64,
    /// Inbound frames dropped as malformed.
    pub messages_malformed: u64,
    /// Outbound sends that failed.
    pub delivery_failures: u64,
}
