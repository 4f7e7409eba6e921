//! Doctor presence tracking.

pub mod monitor;
pub mod registry;
pub mod status;
pub mod tracker;

pub use monitor::InactivityMonitor;
pub use registry::{DoctorRegistry, PresenceRecord};
pub use status::PresenceStatus;
pub use tracker::PresenceTracker;
