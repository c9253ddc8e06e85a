use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use std::fmt;

/// One row per dispatch attempt. The log is append-only; a row's
/// existence says a send was attempted, not that the gateway accepted it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsNotification {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub message: String,
    pub sent_at: DateTime<Utc>,
    pub sent_by: String,
    pub sender_role: SenderRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderRole {
    System,
    Nurse,
    Doctor,
    Patient,
}

impl SenderRole {
    pub fn label(&self) -> &'static str {
        match self {
            SenderRole::System => "System",
            SenderRole::Nurse => "Nurse",
            SenderRole::Doctor => "Doctor",
            SenderRole::Patient => "Patient",
        }
    }
}

impl fmt::Display for SenderRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SenderRole::System => write!(f, "system"),
            SenderRole::Nurse => write!(f, "nurse"),
            SenderRole::Doctor => write!(f, "doctor"),
            SenderRole::Patient => write!(f, "patient"),
        }
    }
}

/// Direct send, bypassing the patient lookup (staff tooling).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendSmsRequest {
    pub phone_number: String,
    pub message: String,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum NotificationError {
    #[error("SMS gateway not configured")]
    NotConfigured,

    #[error("SMS gateway error: {0}")]
    GatewayError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
