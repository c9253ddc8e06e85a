use std::sync::Arc;

use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_database::supabase::SupabaseClient;

use crate::models::{Appointment, AppointmentError, TreatmentRecord};

/// Treatment entries hang off completed visits. One record per completed
/// appointment is the intent, enforced by the existence check rather than
/// a constraint, and records are never deleted automatically.
pub struct TreatmentRecordService {
    supabase: Arc<SupabaseClient>,
}

impl TreatmentRecordService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    /// Create the record for a completed visit unless one already exists.
    /// Calling this twice for the same appointment is a no-op.
    pub async fn ensure_for_appointment(
        &self,
        appointment: &Appointment,
        diagnosis: &str,
    ) -> Result<(), AppointmentError> {
        if self.exists_for_appointment(appointment.id).await? {
            debug!("Treatment record already exists for appointment {}", appointment.id);
            return Ok(());
        }

        let record = json!({
            "patient_id": appointment.patient_id,
            "appointment_id": appointment.id,
            "diagnosis": diagnosis,
            "details": "Dialysis session completed",
            "treatment_date": appointment.appointment_date.to_rfc3339()
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let _: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/treatment_records",
            Some(record),
            Some(headers),
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        debug!("Created treatment record for appointment {}", appointment.id);
        Ok(())
    }

    pub async fn exists_for_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<bool, AppointmentError> {
        let path = format!(
            "/rest/v1/treatment_records?appointment_id=eq.{}&select=id&limit=1",
            appointment_id
        );
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            None,
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        Ok(!result.is_empty())
    }

    pub async fn list_for_patient(
        &self,
        patient_id: Uuid,
    ) -> Result<Vec<TreatmentRecord>, AppointmentError> {
        let path = format!(
            "/rest/v1/treatment_records?patient_id=eq.{}&order=treatment_date.desc",
            patient_id
        );
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            None,
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        result.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<TreatmentRecord>, _>>()
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse treatment records: {}", e)))
    }
}
