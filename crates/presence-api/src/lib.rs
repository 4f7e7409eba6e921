//! # presence-api
//!
//! HTTP layer for the doctor presence service built on Axum.
//!
//! Serves the `/ws` WebSocket endpoint that feeds frames into the realtime
//! engine, plus a JSON health endpoint.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod router;
pub mod state;

pub use app::build_app;
pub use state::AppState;
