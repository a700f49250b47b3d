use std::collections::BTreeSet;
use std::fmt;

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

// ==============================================================================
// REFERENCE DATA MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specialty {
    pub id: String,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkLocation {
    pub id: String,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub timezone: String,
    pub map_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: String,
    pub full_name: String,
    pub is_male: bool,
    pub degree: String,
    pub avatar_url: Option<String>,
    pub slot_duration_minutes: i32,
    pub specialties: Vec<Specialty>,
    pub work_locations: Vec<WorkLocation>,
}

impl Doctor {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.degree, self.full_name)
    }
}

/// Serde representation for slot boundaries: the scheduling service speaks
/// `HH:MM` strings on the wire.
pub mod slot_time {
    use chrono::NaiveTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// One bookable interval [time_start, time_end) for a doctor/location/date.
/// Produced fresh per date query; never cached across dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    #[serde(with = "slot_time")]
    pub time_start: NaiveTime,
    #[serde(with = "slot_time")]
    pub time_end: NaiveTime,
}

impl TimeSlot {
    pub fn is_morning(&self) -> bool {
        self.time_start.hour() < 12
    }
}

/// Daily slots bucketed for display by the hour of time_start.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlotSections {
    pub morning: Vec<TimeSlot>,
    pub afternoon: Vec<TimeSlot>,
}

/// Bookable dates within one month for a doctor/location pair. Drives
/// calendar-day enablement only; slot validity is re-verified at hold time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AvailableDates {
    pub month: u32,
    pub year: i32,
    pub dates: BTreeSet<NaiveDate>,
}

impl AvailableDates {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

// ==============================================================================
// SELECTION MODELS
// ==============================================================================

/// Which entity drove the current selection and therefore back-fills the
/// others. Set on the first meaningful choice, reset on explicit clear.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    #[default]
    Unset,
    DoctorFirst,
    FilterFirst,
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionMode::Unset => write!(f, "unset"),
            SelectionMode::DoctorFirst => write!(f, "doctor_first"),
            SelectionMode::FilterFirst => write!(f, "filter_first"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    pub mode: SelectionMode,
    pub location_id: String,
    pub location_name: String,
    pub location_address: String,
    pub specialty_id: String,
    pub doctor_id: String,
    pub doctor_name: String,
    pub service_date: Option<NaiveDate>,
    pub selected_slot: Option<TimeSlot>,
    pub time_slots: Vec<TimeSlot>,
}

impl SelectionState {
    /// Drop everything derived from a doctor/location pairing that is no
    /// longer current.
    pub fn clear_availability(&mut self) {
        self.service_date = None;
        self.selected_slot = None;
        self.time_slots.clear();
    }

    pub fn clear_doctor(&mut self) {
        self.doctor_id.clear();
        self.doctor_name.clear();
    }

    pub fn has_doctor(&self) -> bool {
        !self.doctor_id.is_empty()
    }
}

// ==============================================================================
// QUERY MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorListQuery {
    pub page: i32,
    pub limit: i32,
    pub sort: Option<String>,
    pub specialty_ids: Vec<String>,
    pub work_location_ids: Vec<String>,
    pub search: Option<String>,
}

impl Default for DoctorListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 50,
            sort: Some("full_name.asc".to_string()),
            specialty_ids: Vec::new(),
            work_location_ids: Vec::new(),
            search: None,
        }
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum DirectoryError {
    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Work location not found")]
    LocationNotFound,

    #[error("Specialty not found")]
    SpecialtyNotFound,

    #[error("Invalid availability query: {0}")]
    InvalidQuery(String),

    #[error("Scheduling service unavailable: {0}")]
    ServiceUnavailable(String),
}
