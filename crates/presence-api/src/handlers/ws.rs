//! WebSocket upgrade handler.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{debug, error, info, warn};

use presence_realtime::message::serializer;

use crate::state::AppState;

/// GET /ws: WebSocket upgrade
pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_ws_connection(state, socket))
}

/// Handles an established WebSocket connection.
async fn handle_ws_connection(state: AppState, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let connections = &state.realtime.connections;
    let (handle, mut outbound_rx) = connections.open().await;
    let conn_id = handle.id;

    info!(conn_id = %conn_id, "WebSocket connection established");

    // Outbound forwarder
    let outbound_task = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            let text = match serializer::serialize_outbound(&msg) {
                Ok(t) => t,
                Err(e) => {
                    error!(conn_id = %conn_id, error = %e, "Failed to serialize outbound message");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(Message::Text(text)) => {
                connections.handle_inbound(&conn_id, text.as_str()).await;
            }
            Ok(Message::Binary(data)) => {
                debug!(conn_id = %conn_id, len = data.len(), "Ignoring binary frame");
            }
            Ok(Message::Close(_)) => {
                break;
            }
            // Ping/pong are answered by axum
            Ok(_) => {}
            Err(e) => {
                warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    outbound_task.abort();
    connections.close(&conn_id).await;

    info!(conn_id = %conn_id, "WebSocket connection closed");
}
