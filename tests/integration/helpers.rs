//! Shared test helpers for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tower::ServiceExt;

use presence_api::AppState;
use presence_core::config::AppConfig;

const RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// A running server bound to an ephemeral local port.
pub struct TestServer {
    /// Address the server listens on
    pub addr: SocketAddr,
    /// State shared with the running server
    pub state: AppState,
}

impl TestServer {
    /// Start a server with default configuration
    pub async fn spawn() -> Self {
        let state = AppState::new(AppConfig::default());
        let app = presence_api::build_app(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server failed");
        });

        Self { addr, state }
    }

    /// Open a WebSocket client against `/ws`
    pub async fn connect(&self) -> TestClient {
        let (socket, _) = connect_async(format!("ws://{}/ws", self.addr))
            .await
            .expect("Failed to connect WebSocket");
        TestClient { socket }
    }
}

/// Thin JSON client over a WebSocket stream.
pub struct TestClient {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    /// Send a JSON frame
    pub async fn send_json(&mut self, value: Value) {
        self.send_raw(&value.to_string()).await;
    }

    /// Send a raw text frame
    pub async fn send_raw(&mut self, text: &str) {
        self.socket
            .send(Message::text(text))
            .await
            .expect("Failed to send frame");
    }

    /// Receive the next JSON frame, failing the test on timeout
    pub async fn recv_json(&mut self) -> Value {
        loop {
            let frame = tokio::time::timeout(RECV_TIMEOUT, self.socket.next())
                .await
                .expect("Timed out waiting for frame")
                .expect("Stream ended")
                .expect("WebSocket error");

            if let Message::Text(text) = frame {
                return serde_json::from_str(text.as_str()).expect("Frame is not JSON");
            }
        }
    }

    /// Assert nothing arrives within a short window
    pub async fn expect_silence(&mut self) {
        let next = tokio::time::timeout(Duration::from_millis(200), self.socket.next()).await;
        assert!(next.is_err(), "Unexpected frame: {:?}", next);
    }

    /// Close the connection
    pub async fn close(mut self) {
        let _ = self.socket.close(None).await;
    }
}

/// Issue a GET against the router without a socket
pub async fn get_json(router: Router, path: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("GET")
        .uri(path)
        .body(Body::empty())
        .expect("Failed to build request");

    let response = router.oneshot(req).await.expect("Failed to send request");

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("Failed to read body");

    let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);
    (status, body)
}
