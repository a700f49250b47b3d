use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use booking_cell::router::booking_routes;
use directory_cell::router::directory_routes;
use patient_cell::router::patient_routes;
use shared_config::AppConfig;

async fn health(State(state): State<Arc<AppConfig>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "configured": state.is_configured()
    }))
}

pub fn create_router(state: Arc<AppConfig>) -> Router {
    let api_routes = Router::new()
        .merge(directory_routes(state.clone()))
        .merge(patient_routes(state.clone()))
        .merge(booking_routes(state.clone()));

    Router::new()
        .route("/", get(|| async { "Meridian Clinic booking API is running!" }))
        .route("/health", get(health).with_state(state))
        .nest("/api/v1", api_routes)
}
