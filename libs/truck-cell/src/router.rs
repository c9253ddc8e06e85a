use std::sync::Arc;
use axum::{routing::get, Router};
use shared_config::AppConfig;

use crate::handlers;

pub fn create_truck_router(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(handlers::list_trucks))
        .route("/{id}", get(handlers::get_truck))
        .route("/{id}/location", get(handlers::get_truck_location))
        .with_state(config)
}
