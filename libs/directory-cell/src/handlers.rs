use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{DirectoryError, DoctorListQuery};
use crate::services::availability::{partition_slots, AvailabilityService};
use crate::services::catalog::CatalogService;

#[derive(Debug, Deserialize)]
pub struct LocationListParams {
    pub sort: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DoctorSearchParams {
    pub page: Option<i32>,
    pub limit: Option<i32>,
    pub sort: Option<String>,
    pub specialty_ids: Option<String>,
    pub work_location_ids: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MonthlyAvailabilityParams {
    pub location_id: String,
    pub month: u32,
    pub year: i32,
}

#[derive(Debug, Deserialize)]
pub struct DailySlotParams {
    pub location_id: String,
    pub date: NaiveDate,
}

fn map_directory_error(e: DirectoryError) -> AppError {
    match e {
        DirectoryError::DoctorNotFound
        | DirectoryError::LocationNotFound
        | DirectoryError::SpecialtyNotFound => AppError::NotFound(e.to_string()),
        DirectoryError::InvalidQuery(msg) => AppError::BadRequest(msg),
        DirectoryError::ServiceUnavailable(msg) => AppError::ExternalService(msg),
    }
}

fn split_ids(raw: Option<String>) -> Vec<String> {
    raw.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

#[axum::debug_handler]
pub async fn list_locations(
    State(state): State<Arc<AppConfig>>,
    Query(params): Query<LocationListParams>,
) -> Result<Json<Value>, AppError> {
    let catalog = CatalogService::new(&state);

    let locations = catalog
        .list_locations(params.sort.as_deref())
        .await
        .map_err(map_directory_error)?;

    Ok(Json(json!(locations)))
}

#[axum::debug_handler]
pub async fn list_specialties(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let catalog = CatalogService::new(&state);

    let specialties = catalog
        .list_specialties()
        .await
        .map_err(map_directory_error)?;

    Ok(Json(json!(specialties)))
}

#[axum::debug_handler]
pub async fn search_doctors(
    State(state): State<Arc<AppConfig>>,
    Query(params): Query<DoctorSearchParams>,
) -> Result<Json<Value>, AppError> {
    let catalog = CatalogService::new(&state);

    let defaults = DoctorListQuery::default();
    let query = DoctorListQuery {
        page: params.page.unwrap_or(defaults.page),
        limit: params.limit.unwrap_or(defaults.limit),
        sort: params.sort.or(defaults.sort),
        specialty_ids: split_ids(params.specialty_ids),
        work_location_ids: split_ids(params.work_location_ids),
        search: params.search,
    };

    let doctors = catalog
        .list_doctors(&query)
        .await
        .map_err(map_directory_error)?;

    Ok(Json(json!(doctors)))
}

#[axum::debug_handler]
pub async fn get_monthly_availability(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
    Query(params): Query<MonthlyAvailabilityParams>,
) -> Result<Json<Value>, AppError> {
    let availability = AvailabilityService::new(&state);

    let dates = availability
        .monthly_availability(&doctor_id, &params.location_id, params.month, params.year)
        .await
        .map_err(map_directory_error)?;

    Ok(Json(json!(dates)))
}

#[axum::debug_handler]
pub async fn get_daily_slots(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
    Query(params): Query<DailySlotParams>,
) -> Result<Json<Value>, AppError> {
    let availability = AvailabilityService::new(&state);

    let slots = availability
        .daily_slots(&doctor_id, &params.location_id, params.date)
        .await
        .map_err(map_directory_error)?;

    let sections = partition_slots(&slots);

    Ok(Json(json!({
        "date": params.date,
        "slots": sections
    })))
}
