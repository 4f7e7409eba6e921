//! Builder helpers for constructing outbound messages.

use chrono::Utc;

use super::types::{OutboundMessage, ReplyStatus, StatusChangeReason};
use crate::presence::status::PresenceStatus;

/// Build a status update stamped with the current time.
pub fn build_status_update(doctor_id: &str, status: &PresenceStatus) -> OutboundMessage {
    OutboundMessage::DoctorStatusUpdate {
        doctor_id: doctor_id.to_string(),
        status: status.clone(),
        timestamp: Utc::now(),
    }
}

/// Build the auth reply
pub fn build_auth_confirmation(current_status: &PresenceStatus) -> OutboundMessage {
    OutboundMessage::AuthConfirmation {
        status: ReplyStatus::Success,
        current_status: current_status.clone(),
    }
}

/// Build the manual status change reply
pub fn build_status_change_ack(new_status: &PresenceStatus) -> OutboundMessage {
    OutboundMessage::StatusChangeAck {
        status: ReplyStatus::Success,
        new_status: new_status.clone(),
    }
}

/// Build the logout reply
pub fn build_logout_confirmation() -> OutboundMessage {
    OutboundMessage::LogoutConfirmation {
        status: ReplyStatus::Success,
    }
}

/// Build the targeted notice sent to a doctor demoted for inactivity
pub fn build_auto_away() -> OutboundMessage {
    OutboundMessage::AutoStatusChange {
        new_status: PresenceStatus::Away,
        reason: StatusChangeReason::Inactivity,
    }
}
