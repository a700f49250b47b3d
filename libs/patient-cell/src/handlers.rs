use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{NewPatientForm, PatientError, PatientLookup};
use crate::services::identity::PatientResolver;

#[derive(Debug, Deserialize)]
pub struct PatientSearchParams {
    pub email: Option<String>,
    pub phone: Option<String>,
}

fn map_patient_error(e: PatientError) -> AppError {
    match e {
        PatientError::NotFound => AppError::NotFound(e.to_string()),
        PatientError::DuplicateIdentity => AppError::Conflict(e.to_string()),
        PatientError::Validation(msg) => AppError::ValidationError(msg),
        PatientError::NothingToConfirm => AppError::BadRequest(e.to_string()),
        PatientError::ServiceUnavailable(msg) => AppError::ExternalService(msg),
    }
}

#[axum::debug_handler]
pub async fn create_patient(
    State(state): State<Arc<AppConfig>>,
    Json(form): Json<NewPatientForm>,
) -> Result<Json<Value>, AppError> {
    let resolver = PatientResolver::new(&state);

    let patient = resolver
        .create_patient(&form)
        .await
        .map_err(map_patient_error)?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn search_patient(
    State(state): State<Arc<AppConfig>>,
    Query(params): Query<PatientSearchParams>,
) -> Result<Json<Value>, AppError> {
    let lookup = match (params.email, params.phone) {
        (Some(email), None) => PatientLookup::ByEmail(email),
        (None, Some(phone)) => PatientLookup::ByPhone(phone),
        _ => {
            return Err(AppError::BadRequest(
                "Provide exactly one of email or phone".to_string(),
            ))
        }
    };

    let resolver = PatientResolver::new(&state);

    let patient = resolver
        .lookup_patient(&lookup)
        .await
        .map_err(map_patient_error)?;

    Ok(Json(json!(patient)))
}
