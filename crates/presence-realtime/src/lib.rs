//! # presence-realtime
//!
//! Real-time presence engine for the doctor presence service. Provides:
//!
//! - A connection registry mapping each doctor to one presence record and
//!   one live connection
//! - The presence state machine (auth, manual change, activity ping,
//!   logout, disconnect, auto-away)
//! - A fan-out engine for broadcasts, targeted notifications and the
//!   snapshot sent to newly opened connections
//! - A periodic inactivity monitor
//!
//! Every transition runs as one serialized step behind the registry lock;
//! outbound delivery is a non-blocking enqueue on each connection's queue.

pub mod connection;
pub mod fanout;
pub mod message;
pub mod metrics;
pub mod presence;
pub mod server;

pub use connection::manager::ConnectionManager;
pub use fanout::broadcaster::Broadcaster;
pub use presence::monitor::InactivityMonitor;
pub use presence::tracker::PresenceTracker;
pub use server::RealtimeEngine;
