use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{Patient, PatientError, RegisterPatientRequest, UpdateMedicalHistoryRequest};

pub struct PatientService {
    supabase: SupabaseClient,
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn register_patient(
        &self,
        request: RegisterPatientRequest,
    ) -> Result<Patient, PatientError> {
        if request.name.trim().is_empty() {
            return Err(PatientError::ValidationError("Patient name is required".to_string()));
        }

        let now = Utc::now();
        let patient_data = json!({
            "name": request.name,
            "gender": request.gender,
            "date_of_birth": request.date_of_birth,
            "phone_number": request.phone_number,
            "email": request.email,
            "address": request.address,
            "medical_history": request.medical_history,
            "created_at": now.to_rfc3339(),
            "updated_at": now.to_rfc3339()
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/patients",
            Some(patient_data),
            Some(headers),
        ).await.map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        let row = result.first()
            .ok_or_else(|| PatientError::DatabaseError("Failed to create patient".to_string()))?;

        let patient: Patient = serde_json::from_value(row.clone())
            .map_err(|e| PatientError::DatabaseError(format!("Failed to parse patient: {}", e)))?;

        info!("Registered patient {}", patient.id);
        Ok(patient)
    }

    pub async fn get_patient(&self, patient_id: Uuid) -> Result<Patient, PatientError> {
        debug!("Fetching patient: {}", patient_id);

        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            None,
        ).await.map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        let row = result.first().ok_or(PatientError::NotFound)?;

        serde_json::from_value(row.clone())
            .map_err(|e| PatientError::DatabaseError(format!("Failed to parse patient: {}", e)))
    }

    /// Update the chart and, when treatment details are supplied, attach a
    /// TreatmentRecord to the patient's most recent appointment.
    pub async fn update_medical_history(
        &self,
        patient_id: Uuid,
        request: UpdateMedicalHistoryRequest,
    ) -> Result<Patient, PatientError> {
        let patient = self.get_patient(patient_id).await?;

        let mut update_data = serde_json::Map::new();
        if let Some(diagnosis) = request.diagnosis.as_deref() {
            if !diagnosis.trim().is_empty() {
                update_data.insert("medical_history".to_string(), json!(diagnosis));
            }
        }
        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            Some(Value::Object(update_data)),
            Some(headers),
        ).await.map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        let updated: Patient = result.first()
            .map(|row| serde_json::from_value(row.clone()))
            .transpose()
            .map_err(|e| PatientError::DatabaseError(format!("Failed to parse patient: {}", e)))?
            .ok_or(PatientError::NotFound)?;

        if let Some(details) = request.treatment_details.as_deref() {
            if !details.trim().is_empty() {
                self.attach_treatment_record(&patient, request.diagnosis.as_deref(), details).await?;
            }
        }

        info!("Updated medical history for patient {}", patient_id);
        Ok(updated)
    }

    /// A treatment entry needs an appointment to hang off; the latest one
    /// is used, matching how staff record walk-in chart updates.
    async fn attach_treatment_record(
        &self,
        patient: &Patient,
        diagnosis: Option<&str>,
        details: &str,
    ) -> Result<(), PatientError> {
        let path = format!(
            "/rest/v1/appointments?patient_id=eq.{}&order=appointment_date.desc&limit=1",
            patient.id
        );
        let appointments: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            None,
        ).await.map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        let appointment_id = appointments.first()
            .and_then(|a| a.get("id"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or(PatientError::NoAppointment)?;

        let record = json!({
            "patient_id": patient.id,
            "appointment_id": appointment_id,
            "diagnosis": diagnosis.unwrap_or(patient.medical_history.as_deref().unwrap_or("")),
            "details": details,
            "treatment_date": Utc::now().to_rfc3339()
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let _: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/treatment_records",
            Some(record),
            Some(headers),
        ).await.map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        debug!("Attached treatment record for patient {}", patient.id);
        Ok(())
    }
}
