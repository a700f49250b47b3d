use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveTime};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use booking_cell::models::{BookingError, BookingStep};
use booking_cell::services::flow::BookingFlowController;
use directory_cell::models::{SelectionMode, TimeSlot};
use patient_cell::models::NewPatientForm;
use shared_config::AppConfig;
use shared_utils::test_utils::{MockSchedulingResponses, TestConfig};

fn slot(start: &str, end: &str) -> TimeSlot {
    TimeSlot {
        time_start: NaiveTime::parse_from_str(start, "%H:%M").unwrap(),
        time_end: NaiveTime::parse_from_str(end, "%H:%M").unwrap(),
    }
}

fn service_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2027, 6, 10).unwrap()
}

fn valid_form() -> NewPatientForm {
    NewPatientForm {
        full_name: "Niamh Keane".to_string(),
        email: "niamh.keane@example.com".to_string(),
        phone: "+353 85 555 0107".to_string(),
        is_male: false,
        date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1),
        address_line: "4 Chapel Lane".to_string(),
        district: "Rathmines".to_string(),
        province: "Dublin".to_string(),
    }
}

/// Mount the reference-data endpoints every flow start hits.
async fn mount_reference_data(mock_server: &MockServer) {
    let specialty = MockSchedulingResponses::specialty("S1", "Cardiology");
    let location = MockSchedulingResponses::location("L1", "Northside Clinic");
    let doctor =
        MockSchedulingResponses::doctor("D1", "Aoife Brennan", specialty.clone(), location.clone());

    Mock::given(method("GET"))
        .and(path("/api/v1/locations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockSchedulingResponses::paginated(vec![location]),
        ))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/specialties"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockSchedulingResponses::paginated(vec![specialty]),
        ))
        .mount(mock_server)
        .await;

    // Filtered query issued once both pickers are set.
    Mock::given(method("GET"))
        .and(path("/api/v1/doctors"))
        .and(query_param("specialty_ids", "S1"))
        .and(query_param("work_location_ids", "L1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockSchedulingResponses::paginated(vec![doctor.clone()]),
        ))
        .mount(mock_server)
        .await;

    // Initial unfiltered roster.
    Mock::given(method("GET"))
        .and(path("/api/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockSchedulingResponses::paginated(vec![doctor]),
        ))
        .mount(mock_server)
        .await;
}

async fn mount_calendar(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v1/availability/monthly"))
        .and(query_param("doctor_id", "D1"))
        .and(query_param("location_id", "L1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockSchedulingResponses::envelope(json!(["2027-06-10"])),
        ))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/availability/daily"))
        .and(query_param("doctor_id", "D1"))
        .and(query_param("service_date", "2027-06-10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockSchedulingResponses::envelope(json!([
                MockSchedulingResponses::time_slot("09:00", "09:30")
            ])),
        ))
        .mount(mock_server)
        .await;
}

async fn mount_booking_success(mock_server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/v1/bookings/hold"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockSchedulingResponses::envelope(json!({ "event_id": "E1" })),
        ))
        .mount(mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/patients"))
        .respond_with(ResponseTemplate::new(201).set_body_json(
            MockSchedulingResponses::envelope(MockSchedulingResponses::patient(
                "P1",
                "Niamh Keane",
                "niamh.keane@example.com",
            )),
        ))
        .mount(mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/bookings/confirm"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockSchedulingResponses::envelope(json!({ "appointment_id": "A1" })),
        ))
        .mount(mock_server)
        .await;
}

fn config_for(mock_server: &MockServer) -> AppConfig {
    TestConfig::with_base_url(&mock_server.uri()).to_app_config()
}

/// Walk a started flow to the end of step 1 (hold placed).
async fn drive_to_identifying(controller: &mut BookingFlowController) {
    controller.select_location("L1").await.unwrap();
    controller.select_specialty("S1").await.unwrap();
    controller.select_doctor("D1").unwrap();
    controller.show_month(6, 2027).await.unwrap();
    controller.pick_date(service_date()).await.unwrap();
    controller.pick_slot(slot("09:00", "09:30")).unwrap();
    controller.complete_selection().await.unwrap();
}

#[tokio::test]
async fn full_flow_reaches_completed_with_hold_and_patient_in_the_draft() {
    let mock_server = MockServer::start().await;
    mount_reference_data(&mock_server).await;
    mount_calendar(&mock_server).await;
    mount_booking_success(&mock_server).await;

    let config = config_for(&mock_server);
    let mut controller = BookingFlowController::start(&config, None)
        .await
        .expect("flow should start");

    controller.select_location("L1").await.unwrap();
    controller.select_specialty("S1").await.unwrap();
    assert_eq!(controller.selection().mode, SelectionMode::FilterFirst);
    assert_eq!(controller.visible_doctors().len(), 1);

    controller.select_doctor("D1").unwrap();
    controller.show_month(6, 2027).await.unwrap();
    assert!(controller
        .available_dates()
        .expect("month should be loaded")
        .contains(service_date()));

    controller.pick_date(service_date()).await.unwrap();
    assert_eq!(controller.selection().time_slots, vec![slot("09:00", "09:30")]);

    controller.pick_slot(slot("09:00", "09:30")).unwrap();
    controller.complete_selection().await.unwrap();
    assert_eq!(controller.step(), BookingStep::Identifying);
    assert_eq!(controller.draft().event_id, "E1");

    controller.register_patient(&valid_form()).await.unwrap();
    assert_eq!(controller.step(), BookingStep::Confirming);
    assert_eq!(controller.draft().patient_id, "P1");

    let receipt = controller.confirm("checkup").await.unwrap();
    assert_eq!(receipt.appointment_id, "A1");
    assert_eq!(controller.step(), BookingStep::Completed);

    let draft = controller.draft();
    assert_eq!(draft.event_id, "E1");
    assert_eq!(draft.patient_id, "P1");
    assert_eq!(draft.doctor_id, "D1");
    assert_eq!(draft.specialty_id, "S1");
    assert_eq!(draft.service_date, Some(service_date()));
    assert_eq!(draft.reason, "checkup");
}

#[tokio::test]
async fn back_navigation_preserves_every_draft_field() {
    let mock_server = MockServer::start().await;
    mount_reference_data(&mock_server).await;
    mount_calendar(&mock_server).await;
    mount_booking_success(&mock_server).await;

    let config = config_for(&mock_server);
    let mut controller = BookingFlowController::start(&config, None)
        .await
        .expect("flow should start");

    drive_to_identifying(&mut controller).await;
    assert_eq!(controller.step(), BookingStep::Identifying);

    let snapshot = controller.draft().clone();
    controller.back().unwrap();
    assert_eq!(controller.step(), BookingStep::Selecting);
    assert_eq!(controller.draft(), &snapshot);

    // Forward again, then back from the confirmation step.
    controller.complete_selection().await.unwrap();
    controller.register_patient(&valid_form()).await.unwrap();
    let snapshot = controller.draft().clone();
    controller.back().unwrap();
    assert_eq!(controller.step(), BookingStep::Identifying);
    assert_eq!(controller.draft(), &snapshot);
}

#[tokio::test]
async fn rejected_hold_keeps_the_flow_at_selection_with_no_event_id() {
    let mock_server = MockServer::start().await;
    mount_reference_data(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/availability/monthly"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockSchedulingResponses::envelope(json!(["2027-06-10"])),
        ))
        .mount(&mock_server)
        .await;

    // Initial fetch plus the refresh after the rejected hold.
    Mock::given(method("GET"))
        .and(path("/api/v1/availability/daily"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockSchedulingResponses::envelope(json!([
                MockSchedulingResponses::time_slot("09:00", "09:30")
            ])),
        ))
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/bookings/hold"))
        .respond_with(ResponseTemplate::new(409).set_body_json(
            MockSchedulingResponses::rejection("slot already held"),
        ))
        .mount(&mock_server)
        .await;

    let config = config_for(&mock_server);
    let mut controller = BookingFlowController::start(&config, None)
        .await
        .expect("flow should start");

    controller.select_location("L1").await.unwrap();
    controller.select_specialty("S1").await.unwrap();
    controller.select_doctor("D1").unwrap();
    controller.show_month(6, 2027).await.unwrap();
    controller.pick_date(service_date()).await.unwrap();
    controller.pick_slot(slot("09:00", "09:30")).unwrap();

    let result = controller.complete_selection().await;
    assert_matches!(result, Err(BookingError::SlotUnavailable));
    assert_eq!(controller.step(), BookingStep::Selecting);
    assert!(controller.draft().event_id.is_empty());
    // The displayed slot list was refreshed for the user to re-pick.
    assert_eq!(controller.selection().time_slots, vec![slot("09:00", "09:30")]);
}

#[tokio::test]
async fn failed_commit_is_terminal_for_the_attempt_but_not_the_flow() {
    let mock_server = MockServer::start().await;
    mount_reference_data(&mock_server).await;
    mount_calendar(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/bookings/hold"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockSchedulingResponses::envelope(json!({ "event_id": "E1" })),
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/patients"))
        .respond_with(ResponseTemplate::new(201).set_body_json(
            MockSchedulingResponses::envelope(MockSchedulingResponses::patient(
                "P1",
                "Niamh Keane",
                "niamh.keane@example.com",
            )),
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/bookings/confirm"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockSchedulingResponses::rejection("hold expired"),
        ))
        .mount(&mock_server)
        .await;

    let config = config_for(&mock_server);
    let mut controller = BookingFlowController::start(&config, None)
        .await
        .expect("flow should start");

    drive_to_identifying(&mut controller).await;
    controller.register_patient(&valid_form()).await.unwrap();

    let result = controller.confirm("checkup").await;
    assert_matches!(result, Err(BookingError::CommitFailed(_)));
    // No automatic retry; the user resubmits explicitly from where they are.
    assert_eq!(controller.step(), BookingStep::Confirming);
}

#[tokio::test]
async fn completed_flow_accepts_no_further_transitions() {
    let mock_server = MockServer::start().await;
    mount_reference_data(&mock_server).await;
    mount_calendar(&mock_server).await;
    mount_booking_success(&mock_server).await;

    let config = config_for(&mock_server);
    let mut controller = BookingFlowController::start(&config, None)
        .await
        .expect("flow should start");

    drive_to_identifying(&mut controller).await;
    controller.register_patient(&valid_form()).await.unwrap();
    controller.confirm("").await.unwrap();
    assert_eq!(controller.step(), BookingStep::Completed);

    assert_matches!(controller.back(), Err(BookingError::InvalidTransition(_)));
    assert_matches!(
        controller.select_location("L1").await,
        Err(BookingError::InvalidTransition(_))
    );
}

#[tokio::test]
async fn deep_link_doctor_preselects_and_back_fills() {
    let mock_server = MockServer::start().await;
    mount_reference_data(&mock_server).await;

    let config = config_for(&mock_server);
    let controller = BookingFlowController::start(&config, Some("D1"))
        .await
        .expect("flow should start");

    let selection = controller.selection();
    assert_eq!(selection.mode, SelectionMode::DoctorFirst);
    assert_eq!(selection.doctor_id, "D1");
    assert_eq!(selection.location_id, "L1");
    assert_eq!(selection.specialty_id, "S1");
}

#[tokio::test]
async fn unknown_deep_link_doctor_is_silently_ignored() {
    let mock_server = MockServer::start().await;
    mount_reference_data(&mock_server).await;

    let config = config_for(&mock_server);
    let controller = BookingFlowController::start(&config, Some("ghost"))
        .await
        .expect("flow should start");

    assert_eq!(controller.selection().mode, SelectionMode::Unset);
    assert!(controller.selection().doctor_id.is_empty());
}

#[tokio::test]
async fn past_dates_are_rejected_before_any_slot_fetch() {
    let mock_server = MockServer::start().await;
    mount_reference_data(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/availability/daily"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = config_for(&mock_server);
    let mut controller = BookingFlowController::start(&config, Some("D1"))
        .await
        .expect("flow should start");

    let result = controller
        .pick_date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap())
        .await;
    assert_matches!(result, Err(BookingError::Validation(_)));
}
