use std::sync::Arc;
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::TruckError;
use crate::services::TruckService;

impl From<TruckError> for AppError {
    fn from(e: TruckError) -> Self {
        match e {
            TruckError::NotFound => AppError::NotFound("Truck not found".to_string()),
            TruckError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

#[axum::debug_handler]
pub async fn list_trucks(
    State(config): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = TruckService::new(&config);

    let trucks = service.list_trucks().await?;

    Ok(Json(json!(trucks)))
}

#[axum::debug_handler]
pub async fn get_truck(
    State(config): State<Arc<AppConfig>>,
    Path(truck_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = TruckService::new(&config);

    let truck = service.get_truck(truck_id).await?;

    Ok(Json(json!(truck)))
}

#[axum::debug_handler]
pub async fn get_truck_location(
    State(config): State<Arc<AppConfig>>,
    Path(truck_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = TruckService::new(&config);

    let truck = service.get_truck(truck_id).await?;

    Ok(Json(json!({
        "truck_id": truck.id,
        "license_plate": truck.license_plate,
        "current_location": truck.current_location
    })))
}
