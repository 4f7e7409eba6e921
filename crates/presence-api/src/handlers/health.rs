//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::dto::response::HealthResponse;
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let realtime = &state.realtime;
    let metrics = realtime.metrics.snapshot();

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        connections: realtime.connections.connection_count(),
        doctors: realtime.presence.doctor_count().await,
        connections_total: metrics.connections_total,
        connections_active: metrics.connections_active,
        messages_sent: metrics.messages_sent,
        messages_received: metrics.messages_received,
        messages_malformed: metrics.messages_malformed,
        delivery_failures: metrics.delivery_failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use presence_core::config::AppConfig;

    #[tokio::test]
    async fn test_health_reports_engine_counts() {
        let state = AppState::new(AppConfig::default());
        let (conn, _rx) = state.realtime.connections.open().await;
        state
            .realtime
            .connections
            .handle_inbound(&conn.id, r#"{"type":"doctor_auth","doctorId":"d-1"}"#)
            .await;

        let Json(body) = health(State(state)).await;

        assert_eq!(body.status, "ok");
        assert_eq!(body.connections, 1);
        assert_eq!(body.doctors, 1);
        assert_eq!(body.connections_total, 1);
        assert_eq!(body.connections_active, 1);
        assert_eq!(body.messages_received, 1);
        assert_eq!(body.messages_malformed, 0);
    }

    #[tokio::test]
    async fn test_health_counts_closed_connections() {
        let state = AppState::new(AppConfig::default());
        let (first, _first_rx) = state.realtime.connections.open().await;
        let (_second, _second_rx) = state.realtime.connections.open().await;
        state.realtime.connections.close(&first.id).await;

        let Json(body) = health(State(state)).await;

        assert_eq!(body.connections, 1);
        assert_eq!(body.connections_total, 2);
        assert_eq!(body.connections_active, 1);
    }
}
