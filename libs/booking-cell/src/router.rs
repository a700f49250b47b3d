use std::sync::Arc;

use axum::{routing::post, Router};

use shared_config::AppConfig;

use crate::handlers;

pub fn booking_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/bookings/hold", post(handlers::place_hold))
        .route("/bookings/confirm", post(handlers::confirm_booking))
        .with_state(state)
}
