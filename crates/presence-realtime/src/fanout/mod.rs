//! Outbound fan-out: broadcasts, targeted notifications and snapshots.

pub mod broadcaster;

pub use broadcaster::Broadcaster;
