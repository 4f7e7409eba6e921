//! Connection manager: connection lifecycle and inbound message dispatch.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use presence_core::config::presence::PresenceConfig;

use crate::message::serializer;
use crate::message::types::{InboundMessage, OutboundMessage};
use crate::message::validator;
use crate::metrics::RealtimeMetrics;
use crate::presence::tracker::PresenceTracker;

use super::handle::{ConnectionHandle, ConnectionId};
use super::pool::ConnectionPool;

/// Manages all open WebSocket connections.
#[derive(Debug)]
pub struct ConnectionManager {
    /// Connection pool.
    pool: Arc<ConnectionPool>,
    /// Presence state machine.
    presence: Arc<PresenceTracker>,
    /// Metrics.
    metrics: Arc<RealtimeMetrics>,
    /// Configuration.
    config: PresenceConfig,
}

impl ConnectionManager {
    /// Creates a new connection manager.
    pub fn new(
        config: PresenceConfig,
        pool: Arc<ConnectionPool>,
        presence: Arc<PresenceTracker>,
        metrics: Arc<RealtimeMetrics>,
    ) -> Self {
        Self {
            pool,
            presence,
            metrics,
            config,
        }
    }

    /// Registers a newly opened connection and queues its presence snapshot.
    ///
    /// Returns the connection handle and a receiver for outbound messages.
    pub async fn open(&self) -> (Arc<ConnectionHandle>, mpsc::Receiver<OutboundMessage>) {
        let (handle, rx) = ConnectionHandle::channel(self.config.channel_buffer_size);
        let handle = Arc::new(handle);

        let snapshot = self.presence.connect(handle.clone()).await;
        self.metrics.connection_opened();

        info!(
            conn_id = %handle.id,
            snapshot,
            "WebSocket connection registered"
        );

        (handle, rx)
    }

    /// Processes a raw inbound text frame from a client.
    ///
    /// Malformed frames are dropped; the connection stays open.
    pub async fn handle_inbound(&self, conn_id: &ConnectionId, raw_message: &str) {
        self.metrics.message_received();

        let Some(handle) = self.pool.get(conn_id) else {
            warn!(conn_id = %conn_id, "Message from unknown connection");
            return;
        };

        if let Err(e) = validator::validate_inbound(raw_message, self.config.max_message_bytes) {
            self.metrics.message_malformed();
            warn!(conn_id = %conn_id, error = %e, "Dropping invalid message");
            return;
        }

        let msg = match serializer::deserialize_inbound(raw_message) {
            Ok(m) => m,
            Err(e) => {
                self.metrics.message_malformed();
                warn!(conn_id = %conn_id, error = %e, "Failed to parse message");
                return;
            }
        };

        self.dispatch(&handle, msg).await;
    }

    /// Routes a decoded message to the presence state machine.
    pub async fn dispatch(&self, handle: &Arc<ConnectionHandle>, msg: InboundMessage) {
        debug!(conn_id = %handle.id, message = ?msg, "Received message");

        match msg {
            InboundMessage::DoctorAuth { doctor_id, status } => {
                self.presence.authenticate(handle, &doctor_id, status).await;
            }
            InboundMessage::StatusChange {
                doctor_id,
                new_status,
            } => {
                self.presence
                    .change_status(handle, &doctor_id, new_status)
                    .await;
            }
            InboundMessage::ActivityPing { doctor_id } => {
                self.presence.activity_ping(&doctor_id).await;
            }
            InboundMessage::DoctorLogout { doctor_id } => {
                self.presence.logout(handle, &doctor_id).await;
            }
            InboundMessage::Unknown => {
                debug!(conn_id = %handle.id, "Ignoring unknown message type");
            }
        }
    }

    /// Unregisters a closed connection, taking its doctor offline.
    pub async fn close(&self, conn_id: &ConnectionId) {
        let open_secs = self.pool.get(conn_id).map(|handle| {
            handle.mark_dead();
            handle.open_duration(Utc::now()).num_seconds()
        });

        let doctor = self.presence.disconnect(conn_id).await;
        self.metrics.connection_closed();

        info!(
            conn_id = %conn_id,
            doctor_id = doctor.as_deref().unwrap_or("-"),
            open_secs = open_secs.unwrap_or_default(),
            "WebSocket connection unregistered"
        );
    }

    /// Closes all connections.
    pub async fn close_all(&self) {
        let all = self.pool.drain();
        for conn in &all {
            conn.mark_dead();
        }
        info!(count = all.len(), "All connections closed");
    }

    /// Returns the total connection count.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }
}
