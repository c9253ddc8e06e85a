use std::sync::Arc;

use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use notification_cell::models::SenderRole;
use notification_cell::services::NotificationDispatchService;

use crate::models::{Appointment, AppointmentError, AppointmentStatus};
use crate::services::treatment::TreatmentRecordService;

/// Drives an appointment through Scheduled → Completed/Cancelled and owns
/// the side effects of each transition. The status enum's transition table
/// is the single source of truth; this service only adds persistence and
/// the per-state error messages callers need to render precise rejections.
pub struct AppointmentLifecycleService {
    supabase: Arc<SupabaseClient>,
    dispatcher: NotificationDispatchService,
    treatments: TreatmentRecordService,
}

impl AppointmentLifecycleService {
    pub fn new(config: &AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));
        Self {
            treatments: TreatmentRecordService::new(Arc::clone(&supabase)),
            dispatcher: NotificationDispatchService::new(config),
            supabase,
        }
    }

    /// Reject a transition the table does not allow, naming the terminal
    /// state that blocks it so "already cancelled" and "already completed"
    /// stay distinguishable for the caller.
    pub fn validate_transition(
        current: AppointmentStatus,
        next: AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        if current.valid_transitions().contains(&next) {
            return Ok(());
        }

        warn!("Invalid status transition attempted: {} -> {}", current, next);
        Err(Self::terminal_state_error(current))
    }

    fn terminal_state_error(status: AppointmentStatus) -> AppointmentError {
        match status {
            AppointmentStatus::Completed => AppointmentError::AlreadyCompleted,
            AppointmentStatus::Cancelled => AppointmentError::AlreadyCancelled,
            AppointmentStatus::Missed => AppointmentError::AlreadyMissed,
            // Scheduled allows every transition, so this is unreachable from
            // validate_transition; kept total for update_status races.
            AppointmentStatus::Scheduled => {
                AppointmentError::ValidationError("Appointment is still scheduled".to_string())
            }
        }
    }

    /// Staff marks a visit as done. Requires notes, creates the treatment
    /// record if this visit has none yet, then confirms by SMS.
    pub async fn complete(
        &self,
        appointment_id: Uuid,
        notes: &str,
    ) -> Result<Appointment, AppointmentError> {
        if notes.trim().is_empty() {
            return Err(AppointmentError::ValidationError(
                "Completion notes are required".to_string(),
            ));
        }

        let appointment = self.get_appointment(appointment_id).await?;
        Self::validate_transition(appointment.status, AppointmentStatus::Completed)?;

        let updated = self
            .update_status(&appointment, AppointmentStatus::Completed, Some(notes))
            .await?;

        // The record must exist before the patient is told the visit is
        // closed; its absence would orphan the medical trail.
        self.treatments.ensure_for_appointment(&updated, notes).await?;

        let message = format!(
            "Your dialysis treatment on {} has been completed and recorded.",
            updated.appointment_date.format("%A, %b %d %Y %H:%M"),
        );
        self.dispatcher
            .notify(updated.patient_id, &message, SenderRole::Nurse)
            .await;

        info!("Appointment {} completed", appointment_id);
        Ok(updated)
    }

    pub async fn cancel(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        let appointment = self.get_appointment(appointment_id).await?;
        Self::validate_transition(appointment.status, AppointmentStatus::Cancelled)?;

        let updated = self
            .update_status(&appointment, AppointmentStatus::Cancelled, None)
            .await?;

        let message = format!(
            "Your dialysis appointment on {} has been cancelled. You can rebook at any time.",
            updated.appointment_date.format("%A, %b %d %Y %H:%M"),
        );
        self.dispatcher
            .notify(updated.patient_id, &message, SenderRole::Patient)
            .await;

        info!("Appointment {} cancelled", appointment_id);
        Ok(updated)
    }

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Fetching appointment: {}", appointment_id);

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            None,
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let row = result.first().ok_or(AppointmentError::NotFound)?;

        serde_json::from_value(row.clone())
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e)))
    }

    pub async fn appointments_for_patient(
        &self,
        patient_id: Uuid,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?patient_id=eq.{}&order=appointment_date.desc",
            patient_id
        );
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            None,
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        result.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Appointment>, _>>()
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointments: {}", e)))
    }

    /// Guarded update: the PATCH filter re-asserts the expected current
    /// status, so a racing transition on the same row loses cleanly and is
    /// reported from the row's actual state.
    async fn update_status(
        &self,
        appointment: &Appointment,
        next: AppointmentStatus,
        notes: Option<&str>,
    ) -> Result<Appointment, AppointmentError> {
        let mut update_data = serde_json::Map::new();
        update_data.insert("status".to_string(), json!(next));
        if let Some(notes) = notes {
            update_data.insert("notes".to_string(), json!(notes));
        }
        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!(
            "/rest/v1/appointments?id=eq.{}&status=eq.{}",
            appointment.id, appointment.status
        );
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            Some(Value::Object(update_data)),
            Some(headers),
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        match result.first() {
            Some(row) => serde_json::from_value(row.clone())
                .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse updated appointment: {}", e))),
            None => {
                // Nothing matched the guard: the row moved under us.
                let current = self.get_appointment(appointment.id).await?;
                Err(Self::terminal_state_error(current.status))
            }
        }
    }
}
