use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub is_male: bool,
    pub date_of_birth: NaiveDate,
    pub address_line: String,
    pub district: String,
    pub province: String,
}

/// Fields for the new-patient path. Every field is required; validation runs
/// before any network call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewPatientForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub is_male: bool,
    pub date_of_birth: Option<NaiveDate>,
    pub address_line: String,
    pub district: String,
    pub province: String,
}

impl NewPatientForm {
    pub fn validate(&self) -> Result<(), PatientError> {
        let missing = [
            ("full_name", self.full_name.is_empty()),
            ("email", self.email.is_empty()),
            ("phone", self.phone.is_empty()),
            ("date_of_birth", self.date_of_birth.is_none()),
            ("address_line", self.address_line.is_empty()),
            ("district", self.district.is_empty()),
            ("province", self.province.is_empty()),
        ]
        .iter()
        .filter(|(_, absent)| *absent)
        .map(|(name, _)| *name)
        .collect::<Vec<_>>();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(PatientError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )))
        }
    }
}

/// Exactly one search discriminator, by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatientLookup {
    ByEmail(String),
    ByPhone(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum PatientError {
    #[error("No patient record matched the search")]
    NotFound,

    #[error("A patient with this email already exists - search for your record under returning patient instead")]
    DuplicateIdentity,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No found patient record to confirm")]
    NothingToConfirm,

    #[error("Patient service unavailable: {0}")]
    ServiceUnavailable(String),
}
