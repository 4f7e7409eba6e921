//! WebSocket connection management: handles, pool, lifecycle and dispatch.

pub mod handle;
pub mod manager;
pub mod pool;

pub use handle::{ConnectionHandle, ConnectionId};
pub use manager::ConnectionManager;
pub use pool::ConnectionPool;
