use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use appointment_cell::router::create_appointment_router;
use notification_cell::router::create_notification_router;
use patient_cell::router::create_patient_router;
use truck_cell::router::create_truck_router;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "DialyGo API is running!" }))
        .nest("/appointments", create_appointment_router(state.clone()))
        .nest("/notifications", create_notification_router(state.clone()))
        .nest("/patients", create_patient_router(state.clone()))
        .nest("/trucks", create_truck_router(state))
}
