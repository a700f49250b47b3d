use std::sync::Arc;

use axum::{routing::get, Router};

use shared_config::AppConfig;

use crate::handlers;

pub fn directory_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/locations", get(handlers::list_locations))
        .route("/specialties", get(handlers::list_specialties))
        .route("/doctors", get(handlers::search_doctors))
        .route(
            "/doctors/{doctor_id}/availability",
            get(handlers::get_monthly_availability),
        )
        .route("/doctors/{doctor_id}/slots", get(handlers::get_daily_slots))
        .with_state(state)
}
