use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};

use shared_config::AppConfig;

use crate::handlers;

pub fn create_appointment_router(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(handlers::book_appointment))
        .route("/available/{truck_id}/{date}", get(handlers::get_available_windows))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}/complete", put(handlers::complete_appointment))
        .route("/cancel/{appointment_id}", post(handlers::cancel_appointment))
        .route("/check-missed", post(handlers::check_missed_appointments))
        .route("/patients/{patient_id}", get(handlers::get_patient_appointments))
        .route("/patients/{patient_id}/treatments", get(handlers::get_patient_treatments))
        .with_state(config)
}
