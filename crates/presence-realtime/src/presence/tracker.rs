//! Presence state machine: applies doctor transitions and announces them.
//!
//! Each public operation takes the registry lock for its whole duration, so
//! reading a record, mutating it and deciding what to fan out is one atomic
//! step. Fan-out only enqueues, so holding the lock across it never blocks.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::registry::{DoctorRegistry, PresenceRecord};
use super::status::PresenceStatus;
use crate::connection::handle::{ConnectionHandle, ConnectionId};
use crate::connection::pool::ConnectionPool;
use crate::fanout::broadcaster::Broadcaster;
use crate::message::builder;

/// Owns the doctor registry and drives every presence transition.
#[derive(Debug)]
pub struct PresenceTracker {
    registry: Mutex<DoctorRegistry>,
    pool: Arc<ConnectionPool>,
    broadcaster: Arc<Broadcaster>,
}

impl PresenceTracker {
    /// Create a tracker with an empty registry
    pub fn new(pool: Arc<ConnectionPool>, broadcaster: Arc<Broadcaster>) -> Self {
        Self {
            registry: Mutex::new(DoctorRegistry::new()),
            pool,
            broadcaster,
        }
    }

    /// Admit a new connection as an observer and send it the current state.
    ///
    /// Returns the number of snapshot updates queued.
    pub async fn connect(&self, channel: Arc<ConnectionHandle>) -> usize {
        let registry = self.registry.lock().await;
        self.pool.add(channel.clone());
        self.broadcaster.snapshot(&registry, &channel)
    }

    /// Bind `doctor_id` to `channel`, replacing any earlier session.
    ///
    /// Returns the status the doctor was registered with.
    pub async fn authenticate(
        &self,
        channel: &Arc<ConnectionHandle>,
        doctor_id: &str,
        status: Option<PresenceStatus>,
    ) -> PresenceStatus {
        let mut registry = self.registry.lock().await;

        // A connection speaks for one doctor at a time.
        let earlier = registry
            .find_by_channel(&channel.id)
            .filter(|bound| *bound != doctor_id)
            .map(str::to_string);
        if let Some(earlier) = earlier {
            info!(doctor_id = %earlier, conn_id = %channel.id, "Connection switched doctor");
            self.remove_and_announce(&mut registry, &earlier);
        }

        // An empty status counts as no status.
        let status = status.filter(|s| s.is_resident() && !s.as_str().is_empty());
        let previous = registry.upsert(doctor_id, status, channel.clone());
        if let Some(previous) = previous.filter(|p| p.channel.id != channel.id) {
            info!(
                doctor_id = %doctor_id,
                superseded = %previous.channel.id,
                "Doctor session replaced"
            );
        }

        let current = registry
            .get(doctor_id)
            .map(|record| record.status.clone())
            .unwrap_or_default();

        info!(doctor_id = %doctor_id, status = %current, "Doctor authenticated");

        self.broadcaster
            .reply(channel, builder::build_auth_confirmation(&current));
        self.broadcaster.broadcast(doctor_id, &current);

        current
    }

    /// Apply a manual status change. Unknown doctors are ignored.
    ///
    /// Changing to `offline` removes the doctor. Returns `false` when ignored.
    pub async fn change_status(
        &self,
        channel: &ConnectionHandle,
        doctor_id: &str,
        new_status: PresenceStatus,
    ) -> bool {
        let mut registry = self.registry.lock().await;

        let Some(record) = registry.get_mut(doctor_id) else {
            return false;
        };

        info!(doctor_id = %doctor_id, status = %new_status, "Doctor changed status");

        if !new_status.is_resident() {
            self.broadcaster
                .reply(channel, builder::build_status_change_ack(&new_status));
            self.remove_and_announce(&mut registry, doctor_id);
            return true;
        }

        record.status = new_status.clone();
        record.touch(Utc::now());

        self.broadcaster
            .reply(channel, builder::build_status_change_ack(&new_status));
        self.broadcaster.broadcast(doctor_id, &new_status);
        true
    }

    /// Record activity. An away doctor becomes active again.
    ///
    /// Returns `true` only when a status change was broadcast.
    pub async fn activity_ping(&self, doctor_id: &str) -> bool {
        let mut registry = self.registry.lock().await;

        let Some(record) = registry.get_mut(doctor_id) else {
            return false;
        };

        record.touch(Utc::now());
        if record.status != PresenceStatus::Away {
            return false;
        }

        record.status = PresenceStatus::Active;
        info!(doctor_id = %doctor_id, "Doctor returned from away");
        self.broadcaster.broadcast(doctor_id, &PresenceStatus::Active);
        true
    }

    /// Log a doctor out. Always confirms, even for unknown doctors.
    ///
    /// Returns whether a record was removed.
    pub async fn logout(&self, channel: &ConnectionHandle, doctor_id: &str) -> bool {
        let mut registry = self.registry.lock().await;

        let present = registry.get(doctor_id).is_some();
        if present {
            info!(doctor_id = %doctor_id, "Doctor logged out");
        }

        self.broadcaster
            .reply(channel, builder::build_logout_confirmation());
        if present {
            self.remove_and_announce(&mut registry, doctor_id);
        }
        present
    }

    /// Handle a closed connection: drop it from the observers and take the
    /// doctor bound to it offline.
    pub async fn disconnect(&self, conn_id: &ConnectionId) -> Option<String> {
        let mut registry = self.registry.lock().await;
        self.pool.remove(conn_id);

        let doctor_id = registry.find_by_channel(conn_id)?.to_string();
        info!(doctor_id = %doctor_id, conn_id = %conn_id, "Doctor disconnected");
        self.remove_and_announce(&mut registry, &doctor_id);
        Some(doctor_id)
    }

    /// Active doctors idle for longer than `threshold` at `now`.
    pub async fn idle_candidates(&self, now: DateTime<Utc>, threshold: Duration) -> Vec<String> {
        let registry = self.registry.lock().await;
        let mut idle = Vec::new();
        registry.for_each(|record| {
            if record.status == PresenceStatus::Active && record.is_idle(now, threshold) {
                idle.push(record.doctor_id.clone());
            }
        });
        idle
    }

    /// Demote one doctor to away if it still meets the inactivity guard.
    ///
    /// The guard is re-checked here, so a doctor that logged out or pinged
    /// since it was selected is left alone.
    pub async fn auto_away(&self, doctor_id: &str, now: DateTime<Utc>, threshold: Duration) -> bool {
        let mut registry = self.registry.lock().await;

        let Some(record) = registry.get_mut(doctor_id) else {
            return false;
        };
        if record.status != PresenceStatus::Active || !record.is_idle(now, threshold) {
            return false;
        }

        record.status = PresenceStatus::Away;
        info!(doctor_id = %doctor_id, "Doctor marked as away due to inactivity");

        self.broadcaster.broadcast(doctor_id, &PresenceStatus::Away);
        self.broadcaster
            .notify(&registry, doctor_id, builder::build_auto_away());
        true
    }

    /// Current status of a doctor, `None` when offline
    pub async fn status_of(&self, doctor_id: &str) -> Option<PresenceStatus> {
        let registry = self.registry.lock().await;
        registry.get(doctor_id).map(|record| record.status.clone())
    }

    /// Copy of every resident record
    pub async fn records(&self) -> Vec<PresenceRecord> {
        self.registry.lock().await.snapshot()
    }

    /// Number of doctors currently online
    pub async fn doctor_count(&self) -> usize {
        self.registry.lock().await.len()
    }

    fn remove_and_announce(&self, registry: &mut DoctorRegistry, doctor_id: &str) {
        if registry.remove(doctor_id).is_some() {
            debug!(doctor_id = %doctor_id, "Presence record removed");
            self.broadcaster.broadcast(doctor_id, &PresenceStatus::Offline);
        }
    }
}
