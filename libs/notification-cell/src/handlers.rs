use std::sync::Arc;
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{NotificationError, SendSmsRequest};
use crate::services::NotificationDispatchService;

impl From<NotificationError> for AppError {
    fn from(e: NotificationError) -> Self {
        match e {
            NotificationError::NotConfigured => {
                AppError::ExternalService("SMS gateway not configured".to_string())
            }
            NotificationError::GatewayError(msg) => AppError::ExternalService(msg),
            NotificationError::ValidationError(msg) => AppError::ValidationError(msg),
            NotificationError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

#[axum::debug_handler]
pub async fn get_patient_notifications(
    State(config): State<Arc<AppConfig>>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = NotificationDispatchService::new(&config);

    let notifications = service.list_for_patient(patient_id).await?;

    Ok(Json(json!(notifications)))
}

#[axum::debug_handler]
pub async fn get_all_notifications(
    State(config): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = NotificationDispatchService::new(&config);

    let notifications = service.list_all().await?;

    Ok(Json(json!(notifications)))
}

#[axum::debug_handler]
pub async fn send_sms(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<SendSmsRequest>,
) -> Result<Json<Value>, AppError> {
    if request.phone_number.trim().is_empty() || request.message.trim().is_empty() {
        return Err(AppError::BadRequest("Phone number and message are required".to_string()));
    }

    let service = NotificationDispatchService::new(&config);

    service.send_direct(&request.phone_number, &request.message).await?;

    Ok(Json(json!({
        "success": true,
        "message": "SMS sent successfully!"
    })))
}
