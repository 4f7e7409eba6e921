//! Best-effort delivery of presence events.
//!
//! Every send is a non-blocking enqueue on the recipient's bounded queue. A
//! failed send is counted and logged, and never stops delivery to anyone else.

use std::sync::Arc;

use tracing::debug;

use crate::connection::handle::ConnectionHandle;
use crate::connection::pool::ConnectionPool;
use crate::message::builder;
use crate::message::types::OutboundMessage;
use crate::metrics::RealtimeMetrics;
use crate::presence::registry::DoctorRegistry;
use crate::presence::status::PresenceStatus;

/// Fans presence events out to open connections.
#[derive(Debug)]
pub struct Broadcaster {
    pool: Arc<ConnectionPool>,
    metrics: Arc<RealtimeMetrics>,
}

impl Broadcaster {
    /// Create a broadcaster over the given pool.
    pub fn new(pool: Arc<ConnectionPool>, metrics: Arc<RealtimeMetrics>) -> Self {
        Self { pool, metrics }
    }

    /// Send a `doctor_status_update` to every open connection.
    ///
    /// Returns the number of connections the update was queued on.
    pub fn broadcast(&self, doctor_id: &str, status: &PresenceStatus) -> usize {
        let message = builder::build_status_update(doctor_id, status);

        debug!(doctor_id = %doctor_id, status = %status, "Broadcasting status update");

        self.pool
            .all_connections()
            .iter()
            .filter(|conn| conn.is_alive())
            .filter(|conn| self.deliver(conn, message.clone()))
            .count()
    }

    /// Send a message to the connection bound to `doctor_id`, if it is open.
    pub fn notify(
        &self,
        registry: &DoctorRegistry,
        doctor_id: &str,
        message: OutboundMessage,
    ) -> bool {
        match registry.get(doctor_id) {
            Some(record) if record.channel.is_alive() => {
                debug!(doctor_id = %doctor_id, "Notifying doctor");
                self.deliver(&record.channel, message)
            }
            _ => false,
        }
    }

    /// Send a direct reply to the connection a request came from.
    pub fn reply(&self, channel: &ConnectionHandle, message: OutboundMessage) -> bool {
        self.deliver(channel, message)
    }

    /// Send one status update per resident record to a new connection.
    pub fn snapshot(&self, registry: &DoctorRegistry, channel: &ConnectionHandle) -> usize {
        let mut sent = 0;
        registry.for_each(|record| {
            let update = builder::build_status_update(&record.doctor_id, &record.status);
            if self.deliver(channel, update) {
                sent += 1;
            }
        });
        sent
    }

    fn deliver(&self, channel: &ConnectionHandle, message: OutboundMessage) -> bool {
        let delivered = channel.send(message);
        if !delivered {
            debug!(conn_id = %channel.id, "Delivery failed");
        }
        self.metrics.delivery(delivered);
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::sync::mpsc;

    fn open(pool: &ConnectionPool) -> (Arc<ConnectionHandle>, mpsc::Receiver<OutboundMessage>) {
        let (handle, rx) = ConnectionHandle::channel(8);
        let handle = Arc::new(handle);
        pool.add(handle.clone());
        (handle, rx)
    }

    fn setup() -> (Arc<ConnectionPool>, Arc<RealtimeMetrics>, Broadcaster) {
        let pool = Arc::new(ConnectionPool::new());
        let metrics = Arc::new(RealtimeMetrics::new());
        let broadcaster = Broadcaster::new(pool.clone(), metrics.clone());
        (pool, metrics, broadcaster)
    }

    #[tokio::test]
    async fn test_broadcast_survives_broken_observer() {
        let (pool, metrics, broadcaster) = setup();
        let mut observers: Vec<_> = (0..4).map(|_| open(&pool)).collect();

        let (_broken, broken_rx) = observers.remove(2);
        drop(broken_rx);

        assert_eq!(broadcaster.broadcast("d-1", &PresenceStatus::Active), 3);

        for (_, rx) in observers.iter_mut() {
            match rx.try_recv().unwrap() {
                OutboundMessage::DoctorStatusUpdate {
                    doctor_id, status, ..
                } => {
                    assert_eq!(doctor_id, "d-1");
                    assert_eq!(status, PresenceStatus::Active);
                }
                other => panic!("unexpected message: {other:?}"),
            }
        }
        assert_eq!(metrics.snapshot().messages_sent, 3);
    }

    #[tokio::test]
    async fn test_notify_targets_bound_channel_only() {
        let (pool, _metrics, broadcaster) = setup();
        let (doctor, mut doctor_rx) = open(&pool);
        let (_other, mut other_rx) = open(&pool);

        let mut registry = DoctorRegistry::new();
        registry.upsert("d-1", None, doctor.clone());

        assert!(broadcaster.notify(&registry, "d-1", builder::build_auto_away()));
        assert!(!broadcaster.notify(&registry, "missing", builder::build_auto_away()));

        assert_eq!(doctor_rx.try_recv().unwrap(), builder::build_auto_away());
        assert!(other_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_snapshot_covers_every_record() {
        let (pool, _metrics, broadcaster) = setup();
        let (a, _a_rx) = open(&pool);
        let (b, _b_rx) = open(&pool);
        let (newcomer, mut newcomer_rx) = open(&pool);

        let mut registry = DoctorRegistry::new();
        registry.upsert("a", None, a);
        registry.upsert("b", Some(PresenceStatus::Away), b);

        assert_eq!(broadcaster.snapshot(&registry, &newcomer), 2);

        let mut received = Vec::new();
        while let Ok(OutboundMessage::DoctorStatusUpdate {
            doctor_id, status, ..
        }) = newcomer_rx.try_recv()
        {
            received.push((doctor_id, status));
        }
        received.sort_by(|x, y| x.0.cmp(&y.0));

        assert_eq!(
            received,
            vec![
                ("a".to_string(), PresenceStatus::Active),
                ("b".to_string(), PresenceStatus::Away),
            ]
        );
    }
}
