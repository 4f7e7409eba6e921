//! Route definitions.

use axum::{Router, routing::get};

use crate::handlers;
use crate::state::AppState;

/// Build the router with every route bound to `state`.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new().route("/health", get(handlers::health::health));

    Router::new()
        .route("/ws", get(handlers::ws::ws_handler))
        .nest("/api", api_routes)
        .with_state(state)
}
