use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn patient_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/patients", post(handlers::create_patient))
        .route("/patients/search", get(handlers::search_patient))
        .with_state(state)
}
