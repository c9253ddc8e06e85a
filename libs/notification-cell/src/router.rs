use std::sync::Arc;
use axum::{routing::{get, post}, Router};
use shared_config::AppConfig;

use crate::handlers;

pub fn create_notification_router(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(handlers::get_all_notifications))
        .route("/send", post(handlers::send_sms))
        .route("/{patient_id}", get(handlers::get_patient_notifications))
        .with_state(config)
}
