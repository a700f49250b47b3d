use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use directory_cell::models::DirectoryError;
use patient_cell::models::PatientError;

/// Reason recorded on the appointment when the user leaves the field blank.
pub const DEFAULT_BOOKING_REASON: &str = "General consultation";

// ==============================================================================
// DRAFT MODELS
// ==============================================================================

/// The accumulated booking state threaded through the three steps. Owned
/// exclusively by the flow controller; step components return values that the
/// controller merges in, never mutating the draft themselves.
///
/// event_id is set iff a hold has been created and not yet superseded;
/// patient_id is set iff step 2 has completed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingDraft {
    pub location_id: String,
    pub location_name: String,
    pub location_address: String,
    pub specialty_id: String,
    pub doctor_id: String,
    pub doctor_name: String,
    pub service_date: Option<NaiveDate>,
    pub time_start: Option<NaiveTime>,
    pub time_end: Option<NaiveTime>,
    pub event_id: String,
    pub patient_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStep {
    Selecting,
    Identifying,
    Confirming,
    Completed,
}

impl fmt::Display for BookingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStep::Selecting => write!(f, "selecting"),
            BookingStep::Identifying => write!(f, "identifying"),
            BookingStep::Confirming => write!(f, "confirming"),
            BookingStep::Completed => write!(f, "completed"),
        }
    }
}

/// Step-completion events folded into the draft by the pure reducer. Only the
/// controller dispatches these.
#[derive(Debug, Clone)]
pub enum DraftEvent {
    SelectionLocked {
        location_id: String,
        location_name: String,
        location_address: String,
        specialty_id: String,
        doctor_id: String,
        doctor_name: String,
        service_date: NaiveDate,
        time_start: NaiveTime,
        time_end: NaiveTime,
        event_id: String,
    },
    PatientResolved {
        patient_id: String,
    },
    ReasonProvided {
        reason: String,
    },
    Cleared,
}

// ==============================================================================
// WIRE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldReceipt {
    pub event_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingReceipt {
    pub appointment_id: String,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum BookingError {
    #[error("Selected time slot is not in the current slot list")]
    InvalidSlot,

    #[error("Slot is no longer available")]
    SlotUnavailable,

    #[error("Booking confirmation failed: {0}")]
    CommitFailed(String),

    #[error("Action not allowed at the {0} step")]
    InvalidTransition(BookingStep),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Scheduling service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("{0}")]
    Directory(#[from] DirectoryError),

    #[error("{0}")]
    Patient(#[from] PatientError),
}
