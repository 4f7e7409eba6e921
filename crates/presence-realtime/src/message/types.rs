//! Inbound and outbound WebSocket message type definitions.
//!
//! Every frame is a JSON object with a snake_case `type` discriminator and
//! camelCase fields, e.g. `{"type":"doctor_auth","doctorId":"d-1"}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::presence::status::PresenceStatus;

/// Messages sent by a client to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum InboundMessage {
    /// A doctor announces itself on this connection.
    DoctorAuth {
        /// Doctor identifier.
        doctor_id: String,
        /// Requested initial status; `active` when omitted or empty.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status: Option<PresenceStatus>,
    },
    /// Manual status change.
    StatusChange {
        /// Doctor identifier.
        doctor_id: String,
        /// New status, any string is accepted.
        new_status: PresenceStatus,
    },
    /// Keepalive signalling user activity.
    ActivityPing {
        /// Doctor identifier.
        doctor_id: String,
    },
    /// Explicit logout.
    DoctorLogout {
        /// Doctor identifier.
        doctor_id: String,
    },
    /// Any `type` this server does not know about.
    #[serde(other)]
    Unknown,
}

/// Messages sent by the server to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum OutboundMessage {
    /// Reply to `doctor_auth`.
    AuthConfirmation {
        /// Always `success`.
        status: ReplyStatus,
        /// Status the doctor was registered with.
        current_status: PresenceStatus,
    },
    /// Reply to `status_change`.
    StatusChangeAck {
        /// Always `success`.
        status: ReplyStatus,
        /// Status that was applied.
        new_status: PresenceStatus,
    },
    /// Reply to `doctor_logout`.
    LogoutConfirmation {
        /// Always `success`.
        status: ReplyStatus,
    },
    /// Presence change fanned out to every open connection.
    DoctorStatusUpdate {
        /// Doctor identifier.
        doctor_id: String,
        /// Current status (`offline` when the doctor left).
        status: PresenceStatus,
        /// When the update was generated.
        timestamp: DateTime<Utc>,
    },
    /// Sent only to a doctor demoted by the inactivity monitor.
    AutoStatusChange {
        /// Status the doctor was moved to.
        new_status: PresenceStatus,
        /// Why the server changed it.
        reason: StatusChangeReason,
    },
}

/// Outcome carried by reply messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyStatus {
    /// The request was applied.
    Success,
}

/// Reason attached to a server-initiated status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusChangeReason {
    /// No activity within the configured threshold.
    Inactivity,
}
