use tracing::{debug, warn};

use crate::models::{
    DirectoryError, Doctor, DoctorListQuery, SelectionMode, SelectionState, Specialty, TimeSlot,
    WorkLocation,
};
use crate::services::catalog::CatalogService;

/// Reference data fetched once when the flow starts. Doctors here are the
/// initial unfiltered roster; the resolver re-filters or re-queries without
/// mutating the cache.
#[derive(Debug, Clone, Default)]
pub struct ReferenceCache {
    pub locations: Vec<WorkLocation>,
    pub specialties: Vec<Specialty>,
    pub doctors: Vec<Doctor>,
}

impl ReferenceCache {
    pub async fn load(catalog: &CatalogService) -> Result<Self, DirectoryError> {
        let locations = catalog.list_locations(Some("name.asc")).await?;
        let specialties = catalog.list_specialties().await?;
        let doctors = catalog.list_doctors(&DoctorListQuery::default()).await?;

        Ok(Self {
            locations: locations.items,
            specialties: specialties.items,
            doctors: doctors.items,
        })
    }
}

/// What the caller must do after a selection change. The resolver never
/// performs I/O itself; it hands out a ticket and the caller feeds results
/// back through `apply_doctor_results`.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterEffect {
    None,
    QueryDoctors(DoctorQueryTicket),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DoctorQueryTicket {
    pub seq: u64,
    pub query: DoctorListQuery,
}

/// Keeps {location, specialty, doctor} mutually consistent under the two
/// entry modes, and owns the visible doctor list.
///
/// Doctor-list responses are applied last-request-wins: each issued query
/// carries a sequence number and only the latest one may land. A slow stale
/// response arriving after a fresh one is discarded on arrival.
pub struct CrossFilterResolver {
    cache: ReferenceCache,
    state: SelectionState,
    visible_doctors: Vec<Doctor>,
    query_seq: u64,
}

impl CrossFilterResolver {
    pub fn new(cache: ReferenceCache) -> Self {
        let visible_doctors = cache.doctors.clone();
        Self {
            cache,
            state: SelectionState::default(),
            visible_doctors,
            query_seq: 0,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn visible_doctors(&self) -> &[Doctor] {
        &self.visible_doctors
    }

    pub fn cache(&self) -> &ReferenceCache {
        &self.cache
    }

    /// Both halves of the availability key, once they are both chosen.
    pub fn availability_pair(&self) -> Option<(&str, &str)> {
        if self.state.doctor_id.is_empty() || self.state.location_id.is_empty() {
            None
        } else {
            Some((self.state.doctor_id.as_str(), self.state.location_id.as_str()))
        }
    }

    pub fn select_location(&mut self, location_id: &str) -> FilterEffect {
        let Some(location) = self.cache.locations.iter().find(|l| l.id == location_id) else {
            warn!("Ignoring unknown location id {}", location_id);
            return FilterEffect::None;
        };

        debug!("Location selected: {}", location.name);

        self.state.location_id = location.id.clone();
        self.state.location_name = location.name.clone();
        self.state.location_address = location.address.clone();
        self.state.mode = SelectionMode::FilterFirst;

        // A previously chosen doctor survives a location change, but any
        // availability derived from the old pairing is stale.
        if self.state.has_doctor() {
            self.state.clear_availability();
        }

        self.requery_if_ready()
    }

    pub fn select_specialty(&mut self, specialty_id: &str) -> FilterEffect {
        let Some(specialty) = self.cache.specialties.iter().find(|s| s.id == specialty_id) else {
            warn!("Ignoring unknown specialty id {}", specialty_id);
            return FilterEffect::None;
        };

        debug!("Specialty selected: {}", specialty.name);

        self.state.specialty_id = specialty.id.clone();
        self.state.mode = SelectionMode::FilterFirst;

        // A specialty change invalidates doctor applicability: the user must
        // re-pick rather than keep an inapplicable doctor silently selected.
        if self.state.has_doctor() {
            self.state.clear_doctor();
            self.state.clear_availability();
        }

        self.requery_if_ready()
    }

    /// Select a doctor from the currently visible set. Unknown ids are a
    /// silent no-op since the UI never offers them.
    pub fn select_doctor(&mut self, doctor_id: &str) {
        let Some(doctor) = self.visible_doctors.iter().find(|d| d.id == doctor_id).cloned()
        else {
            warn!("Ignoring unknown doctor id {}", doctor_id);
            return;
        };

        debug!("Doctor selected: {}", doctor.full_name);

        self.state.clear_availability();

        if self.state.location_id.is_empty() && self.state.specialty_id.is_empty() {
            // Doctor-first entry: back-fill the pickers from the doctor's own
            // lists, auto-selecting the first of each.
            self.state.mode = SelectionMode::DoctorFirst;

            if let Some(location) = doctor.work_locations.first() {
                self.state.location_id = location.id.clone();
                self.state.location_name = location.name.clone();
                self.state.location_address = location.address.clone();
            }
            if let Some(specialty) = doctor.specialties.first() {
                self.state.specialty_id = specialty.id.clone();
            }
        }

        self.state.doctor_id = doctor.id;
        self.state.doctor_name = doctor.full_name;
    }

    /// Deep-link entry: behaves like a normal doctor selection when the id is
    /// present in the initial roster, and is silently ignored otherwise.
    pub fn preselect_doctor(&mut self, doctor_id: &str) {
        self.select_doctor(doctor_id);
    }

    /// Apply a doctor-list response. Returns false when the response belongs
    /// to a superseded query and was discarded.
    pub fn apply_doctor_results(&mut self, seq: u64, doctors: Vec<Doctor>) -> bool {
        if seq != self.query_seq {
            debug!(
                "Discarding stale doctor-list response (seq {} < {})",
                seq, self.query_seq
            );
            return false;
        }

        self.visible_doctors = doctors;
        true
    }

    pub fn set_service_date(&mut self, date: chrono::NaiveDate) {
        self.state.service_date = Some(date);
        self.state.selected_slot = None;
        self.state.time_slots.clear();
    }

    pub fn set_time_slots(&mut self, slots: Vec<TimeSlot>) {
        self.state.time_slots = slots;
    }

    /// Select a slot from the fetched list; slots the list does not contain
    /// are ignored the same way unknown doctor ids are.
    pub fn select_slot(&mut self, slot: TimeSlot) {
        if self.state.time_slots.contains(&slot) {
            self.state.selected_slot = Some(slot);
        } else {
            warn!("Ignoring slot not present in the current slot list");
        }
    }

    /// Explicit form clear: back to the unfiltered roster with no mode. Also
    /// bumps the sequence number so an in-flight doctor query cannot land on
    /// the cleared state.
    pub fn clear(&mut self) {
        self.state = SelectionState::default();
        self.visible_doctors = self.cache.doctors.clone();
        self.query_seq += 1;
    }

    /// The doctor-list query runs only when both filters are set; otherwise
    /// the full unfiltered roster is shown.
    fn requery_if_ready(&mut self) -> FilterEffect {
        if self.state.location_id.is_empty() || self.state.specialty_id.is_empty() {
            self.visible_doctors = self.cache.doctors.clone();
            return FilterEffect::None;
        }

        self.query_seq += 1;
        FilterEffect::QueryDoctors(DoctorQueryTicket {
            seq: self.query_seq,
            query: DoctorListQuery {
                specialty_ids: vec![self.state.specialty_id.clone()],
                work_location_ids: vec![self.state.location_id.clone()],
                ..DoctorListQuery::default()
            },
        })
    }
}
