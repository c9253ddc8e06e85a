use std::sync::Arc;
use axum::{routing::{get, post, put}, Router};
use shared_config::AppConfig;

use crate::handlers;

pub fn create_patient_router(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(handlers::register_patient))
        .route("/{id}", get(handlers::get_patient))
        .route("/{id}/medical-history", put(handlers::update_medical_history))
        .with_state(config)
}
