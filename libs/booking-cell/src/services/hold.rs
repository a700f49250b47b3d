use chrono::NaiveDate;
use reqwest::Method;
use serde_json::json;
use tracing::{debug, info, warn};

use directory_cell::models::TimeSlot;
use shared_config::AppConfig;
use shared_gateway::SchedulingClient;
use shared_models::api::ApiResponse;

use crate::models::{BookingError, HoldReceipt};

/// Reserves a specific slot for the rest of the flow so concurrent bookers
/// cannot double-book it. The hold's TTL is owned by the remote service.
pub struct HoldManager {
    gateway: SchedulingClient,
}

impl HoldManager {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            gateway: SchedulingClient::new(config),
        }
    }

    /// Place a hold on the chosen slot. The chosen time_start must match an
    /// entry of the currently fetched slot list exactly; otherwise the call
    /// fails locally and the remote service is never contacted. A remote
    /// rejection surfaces as SlotUnavailable and leaves no event id behind.
    pub async fn place_hold(
        &self,
        doctor_id: &str,
        location_id: &str,
        service_date: NaiveDate,
        slot: TimeSlot,
        current_slots: &[TimeSlot],
    ) -> Result<HoldReceipt, BookingError> {
        let Some(matched) = current_slots
            .iter()
            .find(|candidate| candidate.time_start == slot.time_start)
        else {
            warn!(
                "Rejected hold for {} on {}: slot no longer in the fetched list",
                doctor_id, service_date
            );
            return Err(BookingError::InvalidSlot);
        };

        debug!(
            "Placing hold for doctor {} at {} on {} {}-{}",
            doctor_id,
            location_id,
            service_date,
            matched.time_start.format("%H:%M"),
            matched.time_end.format("%H:%M")
        );

        let hold_data = json!({
            "doctor_id": doctor_id,
            "location_id": location_id,
            "service_date": service_date,
            "time_start": matched.time_start.format("%H:%M").to_string(),
            "time_end": matched.time_end.format("%H:%M").to_string(),
        });

        let response: ApiResponse<HoldReceipt> = match self
            .gateway
            .request(Method::POST, "/api/v1/bookings/hold", Some(hold_data))
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_conflict() => return Err(BookingError::SlotUnavailable),
            Err(e) => return Err(BookingError::ServiceUnavailable(e.to_string())),
        };

        if !response.success {
            warn!("Hold rejected by scheduling service: {}", response.message);
            return Err(BookingError::SlotUnavailable);
        }

        let receipt = response
            .data
            .ok_or_else(|| BookingError::ServiceUnavailable("empty hold response".to_string()))?;

        info!("Hold placed with event id {}", receipt.event_id);
        Ok(receipt)
    }
}
