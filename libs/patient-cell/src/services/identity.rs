use reqwest::Method;
use serde_json::json;
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_gateway::SchedulingClient;
use shared_models::api::ApiResponse;

use crate::models::{NewPatientForm, Patient, PatientError, PatientLookup};

/// Which of the two mutually exclusive identity paths is active. Exactly one
/// path can resolve a patient id; switching tabs discards any in-progress
/// found-patient state on the other side.
#[derive(Debug, Clone, PartialEq)]
pub enum IdentityPath {
    New(NewPatientForm),
    Returning(ReturningSearch),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReturningSearch {
    pub lookup: Option<PatientLookup>,
    pub found: Option<Patient>,
}

/// Resolves a patient identity either by creating a new record or by looking
/// one up for explicit confirmation. Defaults to the new-patient path.
pub struct PatientResolver {
    gateway: SchedulingClient,
    path: IdentityPath,
}

impl PatientResolver {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            gateway: SchedulingClient::new(config),
            path: IdentityPath::New(NewPatientForm::default()),
        }
    }

    pub fn path(&self) -> &IdentityPath {
        &self.path
    }

    pub fn switch_to_new(&mut self) {
        self.path = IdentityPath::New(NewPatientForm::default());
    }

    pub fn switch_to_returning(&mut self) {
        self.path = IdentityPath::Returning(ReturningSearch::default());
    }

    /// Create a new patient record. A duplicate email is a conflict that
    /// steers the user to the returning-patient path, not a generic failure.
    pub async fn create_patient(&self, form: &NewPatientForm) -> Result<Patient, PatientError> {
        form.validate()?;

        debug!("Creating new patient record for {}", form.email);

        let patient_data = json!({
            "full_name": form.full_name,
            "email": form.email,
            "phone": form.phone,
            "is_male": form.is_male,
            "date_of_birth": form.date_of_birth,
            "address_line": form.address_line,
            "district": form.district,
            "province": form.province,
        });

        let response: ApiResponse<Patient> = match self
            .gateway
            .request(Method::POST, "/api/v1/patients", Some(patient_data))
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_conflict() => return Err(PatientError::DuplicateIdentity),
            Err(e) => return Err(PatientError::ServiceUnavailable(e.to_string())),
        };

        let patient = response
            .into_data()
            .ok_or_else(|| PatientError::ServiceUnavailable("empty create response".to_string()))?;

        info!("Patient record created with id {}", patient.id);
        Ok(patient)
    }

    /// Look up an existing patient by exactly one discriminator. Stateless;
    /// used by both the resolver's search flow and the HTTP handler.
    pub async fn lookup_patient(&self, lookup: &PatientLookup) -> Result<Patient, PatientError> {
        let path = match lookup {
            PatientLookup::ByEmail(email) => {
                format!("/api/v1/patients/search?email={}", urlencoding::encode(email))
            }
            PatientLookup::ByPhone(phone) => {
                format!("/api/v1/patients/search?phone={}", urlencoding::encode(phone))
            }
        };

        debug!("Searching patient record");

        let response: ApiResponse<Patient> = match self.gateway.request(Method::GET, &path, None).await
        {
            Ok(response) => response,
            Err(e) if e.is_not_found() => return Err(PatientError::NotFound),
            Err(e) => return Err(PatientError::ServiceUnavailable(e.to_string())),
        };

        response.into_data().ok_or(PatientError::NotFound)
    }

    /// Returning-patient search. The found record is held for display only -
    /// step 2 completes through `confirm_found`, never through search itself.
    pub async fn search(&mut self, lookup: PatientLookup) -> Result<Patient, PatientError> {
        let patient = self.lookup_patient(&lookup).await?;

        self.path = IdentityPath::Returning(ReturningSearch {
            lookup: Some(lookup),
            found: Some(patient.clone()),
        });

        Ok(patient)
    }

    /// Explicit continue after the user visually confirmed the found record.
    pub fn confirm_found(&self) -> Result<Patient, PatientError> {
        match &self.path {
            IdentityPath::Returning(ReturningSearch {
                found: Some(patient),
                ..
            }) => Ok(patient.clone()),
            _ => Err(PatientError::NothingToConfirm),
        }
    }
}
