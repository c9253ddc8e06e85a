use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_database::supabase::SupabaseClient;

use crate::models::{AppointmentError, BookAppointmentRequest, CompleteAppointmentRequest};
use crate::services::{
    AppointmentLifecycleService, BookingAdmissionService, MissedAppointmentSweep,
    TreatmentRecordService,
};

impl From<AppointmentError> for AppError {
    fn from(e: AppointmentError) -> Self {
        match e {
            AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
            AppointmentError::PatientNotFound => AppError::NotFound("Patient not found".to_string()),
            AppointmentError::TruckNotFound => AppError::NotFound("Truck not found".to_string()),
            AppointmentError::DuplicateBookingSameDay
            | AppointmentError::SlotFull
            | AppointmentError::SlotContended
            | AppointmentError::AlreadyCompleted
            | AppointmentError::AlreadyCancelled
            | AppointmentError::AlreadyMissed => AppError::Conflict(e.to_string()),
            AppointmentError::InvalidTime(msg) => AppError::BadRequest(msg),
            AppointmentError::ValidationError(msg) => AppError::ValidationError(msg),
            AppointmentError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BookingAdmissionService::new(&config);

    let appointment = service.try_book(request).await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment booked successfully"
    })))
}

#[axum::debug_handler]
pub async fn get_available_windows(
    State(config): State<Arc<AppConfig>>,
    Path((truck_id, date)): Path<(Uuid, NaiveDate)>,
) -> Result<Json<Value>, AppError> {
    let service = BookingAdmissionService::new(&config);

    let truck = service.fetch_truck(truck_id).await?;
    let windows = service.calendar().available_windows(&truck, date).await?;

    Ok(Json(json!(windows)))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(config): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentLifecycleService::new(&config);

    let appointment = service.get_appointment(appointment_id).await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn complete_appointment(
    State(config): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<CompleteAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentLifecycleService::new(&config);

    let appointment = service.complete(appointment_id, &request.notes).await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment completed and treatment saved"
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(config): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentLifecycleService::new(&config);

    let appointment = service.cancel(appointment_id).await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment cancelled successfully"
    })))
}

#[axum::debug_handler]
pub async fn check_missed_appointments(
    State(config): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let sweep = MissedAppointmentSweep::new(&config);

    let outcome = sweep.sweep(Utc::now()).await?;

    Ok(Json(json!({
        "success": true,
        "outcome": outcome
    })))
}

#[axum::debug_handler]
pub async fn get_patient_appointments(
    State(config): State<Arc<AppConfig>>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentLifecycleService::new(&config);

    let appointments = service.appointments_for_patient(patient_id).await?;

    Ok(Json(json!(appointments)))
}

#[axum::debug_handler]
pub async fn get_patient_treatments(
    State(config): State<Arc<AppConfig>>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = TreatmentRecordService::new(Arc::new(SupabaseClient::new(&config)));

    let treatments = service.list_for_patient(patient_id).await?;

    Ok(Json(json!(treatments)))
}
