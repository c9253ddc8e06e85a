use std::sync::Arc;
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{PatientError, RegisterPatientRequest, UpdateMedicalHistoryRequest};
use crate::services::PatientService;

impl From<PatientError> for AppError {
    fn from(e: PatientError) -> Self {
        match e {
            PatientError::NotFound => AppError::NotFound("Patient not found".to_string()),
            PatientError::NoAppointment => {
                AppError::BadRequest("Cannot add treatment: no appointment exists for patient".to_string())
            }
            PatientError::ValidationError(msg) => AppError::ValidationError(msg),
            PatientError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

#[axum::debug_handler]
pub async fn register_patient(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<RegisterPatientRequest>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&config);

    let patient = service.register_patient(request).await?;

    Ok(Json(json!({
        "success": true,
        "patient": patient,
        "message": "Patient registered successfully"
    })))
}

#[axum::debug_handler]
pub async fn get_patient(
    State(config): State<Arc<AppConfig>>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&config);

    let patient = service.get_patient(patient_id).await?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn update_medical_history(
    State(config): State<Arc<AppConfig>>,
    Path(patient_id): Path<Uuid>,
    Json(request): Json<UpdateMedicalHistoryRequest>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&config);

    let patient = service.update_medical_history(patient_id, request).await?;

    Ok(Json(json!({
        "success": true,
        "patient": patient,
        "message": "Patient diagnosis and treatment updated successfully"
    })))
}
