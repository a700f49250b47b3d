use chrono::NaiveDate;
use reqwest::Method;
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_gateway::SchedulingClient;
use shared_models::api::ApiResponse;

use crate::models::{AvailableDates, DirectoryError, SlotSections, TimeSlot};

/// Translates a doctor+location pairing into bookable calendar structure:
/// the set of bookable dates for a month, and concrete slots for one date.
pub struct AvailabilityService {
    gateway: SchedulingClient,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            gateway: SchedulingClient::new(config),
        }
    }

    /// Bookable dates within a month for a doctor/location pair. When either
    /// id is still empty no call fires and the month is simply empty.
    pub async fn monthly_availability(
        &self,
        doctor_id: &str,
        location_id: &str,
        month: u32,
        year: i32,
    ) -> Result<AvailableDates, DirectoryError> {
        if doctor_id.is_empty() || location_id.is_empty() {
            return Ok(AvailableDates {
                month,
                year,
                ..AvailableDates::default()
            });
        }
        if !(1..=12).contains(&month) {
            return Err(DirectoryError::InvalidQuery(format!(
                "month must be between 1 and 12, got {}",
                month
            )));
        }

        debug!(
            "Fetching monthly availability for doctor {} at {} ({}/{})",
            doctor_id, location_id, month, year
        );

        let path = format!(
            "/api/v1/availability/monthly?doctor_id={}&location_id={}&month={}&year={}",
            doctor_id, location_id, month, year
        );

        let response: ApiResponse<Vec<NaiveDate>> = self
            .gateway
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| DirectoryError::ServiceUnavailable(e.to_string()))?;

        Ok(AvailableDates {
            month,
            year,
            dates: response.into_data().unwrap_or_default().into_iter().collect(),
        })
    }

    /// Concrete slots for one date. An empty or not-found result means "no
    /// slots" - only transport-level failures surface as errors, and those
    /// are recoverable by re-selecting the date.
    pub async fn daily_slots(
        &self,
        doctor_id: &str,
        location_id: &str,
        service_date: NaiveDate,
    ) -> Result<Vec<TimeSlot>, DirectoryError> {
        if doctor_id.is_empty() || location_id.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            "Fetching slots for doctor {} at {} on {}",
            doctor_id, location_id, service_date
        );

        let path = format!(
            "/api/v1/availability/daily?doctor_id={}&location_id={}&service_date={}&allow_past=false",
            doctor_id, location_id, service_date
        );

        match self
            .gateway
            .request::<ApiResponse<Vec<TimeSlot>>>(Method::GET, &path, None)
            .await
        {
            Ok(response) => Ok(response.into_data().unwrap_or_default()),
            Err(e) if e.is_not_found() => {
                warn!("No slot data for {} on {}", doctor_id, service_date);
                Ok(Vec::new())
            }
            Err(e) => Err(DirectoryError::ServiceUnavailable(e.to_string())),
        }
    }
}

/// Bucket slots into morning/afternoon by the hour of time_start. Pure
/// display derivation, not a stored property.
pub fn partition_slots(slots: &[TimeSlot]) -> SlotSections {
    let mut sections = SlotSections::default();
    for slot in slots {
        if slot.is_morning() {
            sections.morning.push(*slot);
        } else {
            sections.afternoon.push(*slot);
        }
    }
    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn slot(start: &str, end: &str) -> TimeSlot {
        TimeSlot {
            time_start: NaiveTime::parse_from_str(start, "%H:%M").unwrap(),
            time_end: NaiveTime::parse_from_str(end, "%H:%M").unwrap(),
        }
    }

    #[test]
    fn partition_splits_on_noon() {
        let slots = vec![
            slot("09:00", "09:30"),
            slot("11:30", "12:00"),
            slot("12:00", "12:30"),
            slot("15:00", "15:30"),
        ];

        let sections = partition_slots(&slots);
        assert_eq!(sections.morning, vec![slot("09:00", "09:30"), slot("11:30", "12:00")]);
        assert_eq!(
            sections.afternoon,
            vec![slot("12:00", "12:30"), slot("15:00", "15:30")]
        );
    }

    #[test]
    fn partition_of_empty_list_is_empty() {
        let sections = partition_slots(&[]);
        assert!(sections.morning.is_empty());
        assert!(sections.afternoon.is_empty());
    }
}
