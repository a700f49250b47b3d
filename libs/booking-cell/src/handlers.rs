use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use serde_json::{json, Value};

use directory_cell::models::{slot_time, DirectoryError, TimeSlot};
use directory_cell::services::availability::AvailabilityService;
use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::BookingError;
use crate::services::commit::CommitCoordinator;
use crate::services::hold::HoldManager;

#[derive(Debug, Deserialize)]
pub struct HoldRequestBody {
    pub doctor_id: String,
    pub location_id: String,
    pub service_date: NaiveDate,
    #[serde(with = "slot_time")]
    pub time_start: NaiveTime,
    #[serde(with = "slot_time")]
    pub time_end: NaiveTime,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmRequestBody {
    pub event_id: String,
    pub patient_id: String,
    #[serde(default)]
    pub specialty_id: String,
    #[serde(default)]
    pub reason: String,
}

fn map_booking_error(e: BookingError) -> AppError {
    match e {
        BookingError::InvalidSlot => AppError::ValidationError(e.to_string()),
        BookingError::SlotUnavailable => AppError::SlotUnavailable(e.to_string()),
        BookingError::CommitFailed(msg) => AppError::ExternalService(msg),
        BookingError::InvalidTransition(_) => AppError::BadRequest(e.to_string()),
        BookingError::Validation(msg) => AppError::ValidationError(msg),
        BookingError::ServiceUnavailable(msg) => AppError::ExternalService(msg),
        BookingError::Directory(DirectoryError::InvalidQuery(msg)) => AppError::BadRequest(msg),
        BookingError::Directory(inner) => AppError::ExternalService(inner.to_string()),
        BookingError::Patient(inner) => AppError::ExternalService(inner.to_string()),
    }
}

/// Place a hold on a slot. The slot list is re-fetched here so the requested
/// time is validated against what the service currently offers, mirroring the
/// client-side pre-flight check.
#[axum::debug_handler]
pub async fn place_hold(
    State(state): State<Arc<AppConfig>>,
    Json(body): Json<HoldRequestBody>,
) -> Result<Json<Value>, AppError> {
    let availability = AvailabilityService::new(&state);
    let hold_manager = HoldManager::new(&state);

    let current_slots = availability
        .daily_slots(&body.doctor_id, &body.location_id, body.service_date)
        .await
        .map_err(|e| map_booking_error(e.into()))?;

    let slot = TimeSlot {
        time_start: body.time_start,
        time_end: body.time_end,
    };

    let receipt = hold_manager
        .place_hold(
            &body.doctor_id,
            &body.location_id,
            body.service_date,
            slot,
            &current_slots,
        )
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!(receipt)))
}

#[axum::debug_handler]
pub async fn confirm_booking(
    State(state): State<Arc<AppConfig>>,
    Json(body): Json<ConfirmRequestBody>,
) -> Result<Json<Value>, AppError> {
    let commit = CommitCoordinator::new(&state);

    let receipt = commit
        .confirm_booking(
            &body.event_id,
            &body.patient_id,
            &body.specialty_id,
            &body.reason,
        )
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!(receipt)))
}
