//! Doctor registry: one presence record and one bound connection per doctor.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use super::status::PresenceStatus;
use crate::connection::handle::{ConnectionHandle, ConnectionId};

/// Presence state of one authenticated doctor.
#[derive(Debug, Clone)]
pub struct PresenceRecord {
    /// Doctor identifier
    pub doctor_id: String,
    /// Current status, never `offline`
    pub status: PresenceStatus,
    /// Most recent activity-bearing event
    pub last_activity: DateTime<Utc>,
    /// Connection that most recently authenticated as this doctor
    pub channel: Arc<ConnectionHandle>,
}

impl PresenceRecord {
    /// Refresh the activity timestamp. Never moves backwards.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.last_activity {
            self.last_activity = now;
        }
    }

    /// Whether the record has been idle for strictly longer than `threshold`.
    pub fn is_idle(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        now - self.last_activity > threshold
    }
}

/// Maps doctor IDs to presence records, with a reverse index by connection.
///
/// Not synchronized by itself; [`PresenceTracker`](super::tracker::PresenceTracker)
/// owns the single instance behind its lock.
#[derive(Debug, Default)]
pub struct DoctorRegistry {
    records: HashMap<String, PresenceRecord>,
    by_channel: HashMap<ConnectionId, String>,
}

impl DoctorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace the record for `doctor_id`.
    ///
    /// The new record starts with `status` (or `active`) and the current time
    /// as its last activity. Returns the record it replaced, if any.
    pub fn upsert(
        &mut self,
        doctor_id: &str,
        status: Option<PresenceStatus>,
        channel: Arc<ConnectionHandle>,
    ) -> Option<PresenceRecord> {
        let record = PresenceRecord {
            doctor_id: doctor_id.to_string(),
            status: status.unwrap_or_default(),
            last_activity: Utc::now(),
            channel: channel.clone(),
        };

        let previous = self.records.insert(doctor_id.to_string(), record);
        if let Some(prev) = &previous {
            if prev.channel.id != channel.id {
                self.by_channel.remove(&prev.channel.id);
            }
        }
        self.by_channel.insert(channel.id, doctor_id.to_string());

        previous
    }

    /// Look up a record
    pub fn get(&self, doctor_id: &str) -> Option<&PresenceRecord> {
        self.records.get(doctor_id)
    }

    /// Look up a record for in-place mutation
    pub fn get_mut(&mut self, doctor_id: &str) -> Option<&mut PresenceRecord> {
        self.records.get_mut(doctor_id)
    }

    /// Remove a record. Removing an unknown ID is a no-op.
    pub fn remove(&mut self, doctor_id: &str) -> Option<PresenceRecord> {
        let removed = self.records.remove(doctor_id)?;
        if self
            .by_channel
            .get(&removed.channel.id)
            .is_some_and(|bound| bound == doctor_id)
        {
            self.by_channel.remove(&removed.channel.id);
        }
        Some(removed)
    }

    /// Doctor currently bound to the given connection
    pub fn find_by_channel(&self, conn_id: &ConnectionId) -> Option<&str> {
        self.by_channel.get(conn_id).map(String::as_str)
    }

    /// Point-in-time copy of every record
    pub fn snapshot(&self) -> Vec<PresenceRecord> {
        self.records.values().cloned().collect()
    }

    /// Visit a snapshot of every record, in no particular order.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&PresenceRecord),
    {
        for record in &self.snapshot() {
            f(record);
        }
    }

    /// Number of resident records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no doctor is resident
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
