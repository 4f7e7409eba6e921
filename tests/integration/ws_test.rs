//! Integration tests for the WebSocket presence protocol.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::{TestClient, TestServer};

async fn auth(client: &mut TestClient, doctor_id: &str) {
    client
        .send_json(json!({"type": "doctor_auth", "doctorId": doctor_id}))
        .await;

    let confirmation = client.recv_json().await;
    assert_eq!(confirmation["type"], "auth_confirmation");
    assert_eq!(confirmation["status"], "success");
    assert_eq!(confirmation["currentStatus"], "active");

    let update = client.recv_json().await;
    assert_eq!(update["type"], "doctor_status_update");
    assert_eq!(update["doctorId"], doctor_id);
    assert_eq!(update["status"], "active");
}

#[tokio::test]
async fn test_late_joiner_receives_snapshot() {
    let server = TestServer::spawn().await;

    let mut doctor = server.connect().await;
    auth(&mut doctor, "dr-house").await;

    let mut observer = server.connect().await;
    let snapshot = observer.recv_json().await;

    assert_eq!(snapshot["type"], "doctor_status_update");
    assert_eq!(snapshot["doctorId"], "dr-house");
    assert_eq!(snapshot["status"], "active");
    assert!(snapshot["timestamp"].is_string());
}

#[tokio::test]
async fn test_status_change_is_acked_and_broadcast() {
    let server = TestServer::spawn().await;

    let mut doctor = server.connect().await;
    auth(&mut doctor, "dr-grey").await;
    let mut observer = server.connect().await;
    observer.recv_json().await;

    doctor
        .send_json(json!({"type": "status_change", "doctorId": "dr-grey", "newStatus": "in_surgery"}))
        .await;

    let ack = doctor.recv_json().await;
    assert_eq!(ack["type"], "status_change_ack");
    assert_eq!(ack["newStatus"], "in_surgery");

    let update = observer.recv_json().await;
    assert_eq!(update["doctorId"], "dr-grey");
    assert_eq!(update["status"], "in_surgery");
}

#[tokio::test]
async fn test_logout_confirms_and_broadcasts_offline() {
    let server = TestServer::spawn().await;

    let mut doctor = server.connect().await;
    auth(&mut doctor, "dr-who").await;

    doctor
        .send_json(json!({"type": "doctor_logout", "doctorId": "dr-who"}))
        .await;

    let confirmation = doctor.recv_json().await;
    assert_eq!(confirmation["type"], "logout_confirmation");
    assert_eq!(confirmation["status"], "success");

    let update = doctor.recv_json().await;
    assert_eq!(update["doctorId"], "dr-who");
    assert_eq!(update["status"], "offline");

    assert_eq!(server.state.realtime.presence.doctor_count().await, 0);
}

#[tokio::test]
async fn test_malformed_frame_keeps_connection_open() {
    let server = TestServer::spawn().await;
    let mut client = server.connect().await;

    client.send_raw("{not json").await;
    client
        .send_json(json!({"type": "typing", "doctorId": "dr-1"}))
        .await;
    client.expect_silence().await;

    auth(&mut client, "dr-1").await;
}

#[tokio::test]
async fn test_disconnect_broadcasts_offline() {
    let server = TestServer::spawn().await;

    let mut doctor = server.connect().await;
    auth(&mut doctor, "dr-strange").await;
    let mut observer = server.connect().await;
    observer.recv_json().await;

    doctor.close().await;

    let update = observer.recv_json().await;
    assert_eq!(update["type"], "doctor_status_update");
    assert_eq!(update["doctorId"], "dr-strange");
    assert_eq!(update["status"], "offline");
}

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::spawn().await;
    let mut doctor = server.connect().await;
    auth(&mut doctor, "dr-quinn").await;

    let app = presence_api::build_app(server.state.clone());
    let (status, body) = helpers::get_json(app, "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["connections"], 1);
    assert_eq!(body["doctors"], 1);
    assert_eq!(body["connections_total"], 1);
    assert_eq!(body["connections_active"], 1);
    assert!(body["messages_sent"].as_u64().unwrap() >= 2);
}

#[tokio::test]
async fn test_ws_route_requires_upgrade() {
    let server = TestServer::spawn().await;
    let app = presence_api::build_app(server.state.clone());

    let (status, _) = helpers::get_json(app, "/ws").await;

    assert!(status.is_client_error(), "Expected 4xx, got {}", status);
}
