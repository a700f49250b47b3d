use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use directory_cell::models::{AvailableDates, Doctor, SelectionState, TimeSlot};
use directory_cell::services::availability::AvailabilityService;
use directory_cell::services::catalog::CatalogService;
use directory_cell::services::cross_filter::{CrossFilterResolver, FilterEffect, ReferenceCache};
use patient_cell::models::{NewPatientForm, Patient, PatientLookup};
use patient_cell::services::identity::PatientResolver;
use shared_config::AppConfig;

use crate::models::{BookingDraft, BookingError, BookingReceipt, BookingStep, DraftEvent};
use crate::services::commit::CommitCoordinator;
use crate::services::hold::HoldManager;

/// Fold a step-completion event into the draft. The only way draft fields
/// ever change.
pub fn apply(mut draft: BookingDraft, event: DraftEvent) -> BookingDraft {
    match event {
        DraftEvent::SelectionLocked {
            location_id,
            location_name,
            location_address,
            specialty_id,
            doctor_id,
            doctor_name,
            service_date,
            time_start,
            time_end,
            event_id,
        } => {
            draft.location_id = location_id;
            draft.location_name = location_name;
            draft.location_address = location_address;
            draft.specialty_id = specialty_id;
            draft.doctor_id = doctor_id;
            draft.doctor_name = doctor_name;
            draft.service_date = Some(service_date);
            draft.time_start = Some(time_start);
            draft.time_end = Some(time_end);
            // A new hold supersedes any previous event id - overwrite, not append.
            draft.event_id = event_id;
        }
        DraftEvent::PatientResolved { patient_id } => {
            draft.patient_id = patient_id;
        }
        DraftEvent::ReasonProvided { reason } => {
            draft.reason = reason;
        }
        DraftEvent::Cleared => {
            draft = BookingDraft::default();
        }
    }
    draft
}

/// The three-step booking state machine: Selecting -> Identifying ->
/// Confirming -> Completed. Forward transitions fire only on explicit
/// completion calls; back() never loses draft fields; Completed is terminal.
pub struct BookingFlowController {
    step: BookingStep,
    draft: BookingDraft,
    cross_filter: CrossFilterResolver,
    catalog: CatalogService,
    availability: AvailabilityService,
    hold_manager: HoldManager,
    commit: CommitCoordinator,
    patient_resolver: PatientResolver,
    available_dates: Option<AvailableDates>,
}

impl BookingFlowController {
    /// Start a fresh flow: fetch the reference data once, then optionally
    /// honour a deep-link doctor id (silently ignored when absent from the
    /// roster).
    pub async fn start(
        config: &AppConfig,
        deep_link_doctor: Option<&str>,
    ) -> Result<Self, BookingError> {
        let catalog = CatalogService::new(config);
        let cache = ReferenceCache::load(&catalog).await?;

        Ok(Self::from_cache(config, catalog, cache, deep_link_doctor))
    }

    /// Build a flow over already-loaded reference data.
    pub fn from_cache(
        config: &AppConfig,
        catalog: CatalogService,
        cache: ReferenceCache,
        deep_link_doctor: Option<&str>,
    ) -> Self {
        let mut cross_filter = CrossFilterResolver::new(cache);
        if let Some(doctor_id) = deep_link_doctor {
            cross_filter.preselect_doctor(doctor_id);
        }

        Self {
            step: BookingStep::Selecting,
            draft: BookingDraft::default(),
            cross_filter,
            catalog,
            availability: AvailabilityService::new(config),
            hold_manager: HoldManager::new(config),
            commit: CommitCoordinator::new(config),
            patient_resolver: PatientResolver::new(config),
            available_dates: None,
        }
    }

    pub fn step(&self) -> BookingStep {
        self.step
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn selection(&self) -> &SelectionState {
        self.cross_filter.state()
    }

    pub fn visible_doctors(&self) -> &[Doctor] {
        self.cross_filter.visible_doctors()
    }

    pub fn available_dates(&self) -> Option<&AvailableDates> {
        self.available_dates.as_ref()
    }

    pub fn patient(&mut self) -> &mut PatientResolver {
        &mut self.patient_resolver
    }

    // ==========================================================================
    // STEP 1 - SELECTING
    // ==========================================================================

    pub async fn select_location(&mut self, location_id: &str) -> Result<(), BookingError> {
        self.ensure_step(BookingStep::Selecting)?;
        let effect = self.cross_filter.select_location(location_id);
        self.run_effect(effect).await
    }

    pub async fn select_specialty(&mut self, specialty_id: &str) -> Result<(), BookingError> {
        self.ensure_step(BookingStep::Selecting)?;
        let effect = self.cross_filter.select_specialty(specialty_id);
        self.run_effect(effect).await
    }

    pub fn select_doctor(&mut self, doctor_id: &str) -> Result<(), BookingError> {
        self.ensure_step(BookingStep::Selecting)?;
        self.cross_filter.select_doctor(doctor_id);
        Ok(())
    }

    /// Fetch the bookable dates for a visible month. A no-op while either
    /// half of the doctor/location pairing is still missing; a failure keeps
    /// whatever month was previously loaded.
    pub async fn show_month(&mut self, month: u32, year: i32) -> Result<(), BookingError> {
        self.ensure_step(BookingStep::Selecting)?;

        let Some((doctor_id, location_id)) = self.cross_filter.availability_pair() else {
            debug!("Skipping monthly availability: doctor/location pair incomplete");
            return Ok(());
        };

        let dates = self
            .availability
            .monthly_availability(doctor_id, location_id, month, year)
            .await?;

        self.available_dates = Some(dates);
        Ok(())
    }

    /// Pick a calendar date and fetch its slots. Past dates and dates outside
    /// the loaded month set are rejected before any call is attempted.
    pub async fn pick_date(&mut self, date: NaiveDate) -> Result<(), BookingError> {
        self.ensure_step(BookingStep::Selecting)?;

        if date < Utc::now().date_naive() {
            return Err(BookingError::Validation(
                "service date cannot be in the past".to_string(),
            ));
        }
        if let Some(available) = &self.available_dates {
            if !available.contains(date) {
                return Err(BookingError::Validation(
                    "service date is not bookable".to_string(),
                ));
            }
        }

        let Some((doctor_id, location_id)) = self
            .cross_filter
            .availability_pair()
            .map(|(d, l)| (d.to_string(), l.to_string()))
        else {
            return Err(BookingError::Validation(
                "choose a doctor and location before picking a date".to_string(),
            ));
        };

        self.cross_filter.set_service_date(date);

        let slots = self
            .availability
            .daily_slots(&doctor_id, &location_id, date)
            .await?;
        self.cross_filter.set_time_slots(slots);

        Ok(())
    }

    pub fn pick_slot(&mut self, slot: TimeSlot) -> Result<(), BookingError> {
        self.ensure_step(BookingStep::Selecting)?;
        self.cross_filter.select_slot(slot);
        Ok(())
    }

    /// Complete step 1: place the hold and lock the selection into the draft.
    /// A SlotUnavailable rejection refreshes the displayed slot list and
    /// keeps the flow (and the draft's event id) where it was.
    pub async fn complete_selection(&mut self) -> Result<(), BookingError> {
        self.ensure_step(BookingStep::Selecting)?;

        let selection = self.cross_filter.state().clone();
        if selection.location_id.is_empty() {
            return Err(BookingError::Validation("no location selected".to_string()));
        }
        if selection.doctor_id.is_empty() {
            return Err(BookingError::Validation("no doctor selected".to_string()));
        }
        let service_date = selection
            .service_date
            .ok_or_else(|| BookingError::Validation("no service date selected".to_string()))?;
        let slot = selection
            .selected_slot
            .ok_or_else(|| BookingError::Validation("no time slot selected".to_string()))?;

        let receipt = match self
            .hold_manager
            .place_hold(
                &selection.doctor_id,
                &selection.location_id,
                service_date,
                slot,
                &selection.time_slots,
            )
            .await
        {
            Ok(receipt) => receipt,
            Err(BookingError::SlotUnavailable) => {
                if let Ok(slots) = self
                    .availability
                    .daily_slots(&selection.doctor_id, &selection.location_id, service_date)
                    .await
                {
                    self.cross_filter.set_time_slots(slots);
                }
                return Err(BookingError::SlotUnavailable);
            }
            Err(e) => return Err(e),
        };

        self.draft = apply(
            std::mem::take(&mut self.draft),
            DraftEvent::SelectionLocked {
                location_id: selection.location_id,
                location_name: selection.location_name,
                location_address: selection.location_address,
                specialty_id: selection.specialty_id,
                doctor_id: selection.doctor_id,
                doctor_name: selection.doctor_name,
                service_date,
                time_start: slot.time_start,
                time_end: slot.time_end,
                event_id: receipt.event_id,
            },
        );
        self.step = BookingStep::Identifying;

        info!("Selection locked, moving to patient identification");
        Ok(())
    }

    // ==========================================================================
    // STEP 2 - IDENTIFYING
    // ==========================================================================

    /// New-patient path: create the record and complete step 2.
    pub async fn register_patient(&mut self, form: &NewPatientForm) -> Result<(), BookingError> {
        self.ensure_step(BookingStep::Identifying)?;

        let patient = self.patient_resolver.create_patient(form).await?;

        self.draft = apply(
            std::mem::take(&mut self.draft),
            DraftEvent::PatientResolved {
                patient_id: patient.id,
            },
        );
        self.step = BookingStep::Confirming;

        info!("Patient registered, moving to confirmation");
        Ok(())
    }

    /// Returning-patient search. Does not complete the step; the found record
    /// is only held for the user to confirm.
    pub async fn search_returning(
        &mut self,
        lookup: PatientLookup,
    ) -> Result<Patient, BookingError> {
        self.ensure_step(BookingStep::Identifying)?;
        Ok(self.patient_resolver.search(lookup).await?)
    }

    /// Explicit continue on the found record; completes step 2.
    pub fn confirm_returning(&mut self) -> Result<(), BookingError> {
        self.ensure_step(BookingStep::Identifying)?;

        let patient = self.patient_resolver.confirm_found()?;

        self.draft = apply(
            std::mem::take(&mut self.draft),
            DraftEvent::PatientResolved {
                patient_id: patient.id,
            },
        );
        self.step = BookingStep::Confirming;

        info!("Returning patient confirmed, moving to confirmation");
        Ok(())
    }

    // ==========================================================================
    // STEP 3 - CONFIRMING
    // ==========================================================================

    /// Finalize the appointment. Success is terminal; a CommitFailed leaves
    /// the flow at Confirming for an explicit resubmit.
    pub async fn confirm(&mut self, reason: &str) -> Result<BookingReceipt, BookingError> {
        self.ensure_step(BookingStep::Confirming)?;

        let receipt = self
            .commit
            .confirm_booking(
                &self.draft.event_id,
                &self.draft.patient_id,
                &self.draft.specialty_id,
                reason,
            )
            .await?;

        self.draft = apply(
            std::mem::take(&mut self.draft),
            DraftEvent::ReasonProvided {
                reason: if reason.trim().is_empty() {
                    crate::models::DEFAULT_BOOKING_REASON.to_string()
                } else {
                    reason.to_string()
                },
            },
        );
        self.step = BookingStep::Completed;

        info!("Booking flow completed");
        Ok(receipt)
    }

    // ==========================================================================
    // NAVIGATION
    // ==========================================================================

    /// Step back to the immediately preceding step. Every previously entered
    /// draft field survives.
    pub fn back(&mut self) -> Result<(), BookingError> {
        self.step = match self.step {
            BookingStep::Identifying => BookingStep::Selecting,
            BookingStep::Confirming => BookingStep::Identifying,
            step => return Err(BookingError::InvalidTransition(step)),
        };
        Ok(())
    }

    /// Explicit form clear during step 1.
    pub fn clear_selection(&mut self) -> Result<(), BookingError> {
        self.ensure_step(BookingStep::Selecting)?;
        self.cross_filter.clear();
        self.available_dates = None;
        self.draft = apply(std::mem::take(&mut self.draft), DraftEvent::Cleared);
        Ok(())
    }

    fn ensure_step(&self, expected: BookingStep) -> Result<(), BookingError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(BookingError::InvalidTransition(self.step))
        }
    }

    async fn run_effect(&mut self, effect: FilterEffect) -> Result<(), BookingError> {
        if let FilterEffect::QueryDoctors(ticket) = effect {
            let page = self.catalog.list_doctors(&ticket.query).await?;
            self.cross_filter.apply_doctor_results(ticket.seq, page.items);
        }
        Ok(())
    }
}
