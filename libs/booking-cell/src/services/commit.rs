use reqwest::Method;
use serde_json::json;
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_gateway::SchedulingClient;
use shared_models::api::ApiResponse;

use crate::models::{BookingError, BookingReceipt, DEFAULT_BOOKING_REASON};

/// Finalizes the appointment once hold and patient are both resolved. Trusts
/// the still-live hold; it does not re-validate slot availability.
pub struct CommitCoordinator {
    gateway: SchedulingClient,
}

impl CommitCoordinator {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            gateway: SchedulingClient::new(config),
        }
    }

    /// Confirm the booking. Any non-success is CommitFailed - terminal for
    /// this attempt, with no automatic retry; the user must resubmit.
    pub async fn confirm_booking(
        &self,
        event_id: &str,
        patient_id: &str,
        specialty_id: &str,
        reason: &str,
    ) -> Result<BookingReceipt, BookingError> {
        if event_id.is_empty() {
            return Err(BookingError::Validation(
                "no hold event id - complete slot selection first".to_string(),
            ));
        }
        if patient_id.is_empty() {
            return Err(BookingError::Validation(
                "no patient id - complete patient identification first".to_string(),
            ));
        }

        let reason = if reason.trim().is_empty() {
            DEFAULT_BOOKING_REASON
        } else {
            reason
        };

        debug!("Confirming booking for event {}", event_id);

        let booking_data = json!({
            "event_id": event_id,
            "patient_id": patient_id,
            "specialty_id": specialty_id,
            "reason": reason,
        });

        let response: ApiResponse<BookingReceipt> = match self
            .gateway
            .request(Method::POST, "/api/v1/bookings/confirm", Some(booking_data))
            .await
        {
            Ok(response) => response,
            Err(e) => return Err(BookingError::CommitFailed(e.to_string())),
        };

        if !response.success {
            return Err(BookingError::CommitFailed(response.message));
        }

        let receipt = response
            .data
            .ok_or_else(|| BookingError::CommitFailed("empty confirm response".to_string()))?;

        info!("Booking confirmed as appointment {}", receipt.appointment_id);
        Ok(receipt)
    }
}
