use chrono::{TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::services::MissedAppointmentSweep;
use shared_utils::test_utils::{MockRows, TestConfig};

const PATIENT_ID: &str = "7f3c2a90-1111-4f7e-9b3a-000000000001";
const TRUCK_ID: &str = "7f3c2a90-2222-4f7e-9b3a-000000000002";
const APPOINTMENT_ID: &str = "7f3c2a90-3333-4f7e-9b3a-000000000003";

async fn mount_notification_sinks(server: &MockServer, expected_sms_rows: u64) {
    Mock::given(method("POST"))
        .and(path("/rest/v1/sms_notifications"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockRows::sms_notification(PATIENT_ID, "You missed your appointment")
        ])))
        .expect(expected_sms_rows)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::patient(PATIENT_ID, "Aoife Kelly", "0871234567")
        ])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn overdue_scheduled_appointments_become_missed() {
    let server = MockServer::start().await;
    mount_notification_sinks(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::appointment(APPOINTMENT_ID, PATIENT_ID, TRUCK_ID, "2025-06-01T09:00:00Z", "scheduled")
        ])))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::appointment(APPOINTMENT_ID, PATIENT_ID, TRUCK_ID, "2025-06-01T09:00:00Z", "missed")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::with_supabase_url(&server.uri()).to_app_config();
    let sweep = MissedAppointmentSweep::new(&config);

    let now = Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap();
    let outcome = sweep.sweep(now).await.unwrap();
    assert_eq!(outcome.marked_missed, 1);
}

#[tokio::test]
async fn second_run_finds_nothing_and_sends_nothing() {
    let server = MockServer::start().await;
    mount_notification_sinks(&server, 0).await;

    // Rows already moved to Missed fall out of the scheduled-only query
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let config = TestConfig::with_supabase_url(&server.uri()).to_app_config();
    let sweep = MissedAppointmentSweep::new(&config);

    let now = Utc.with_ymd_and_hms(2025, 6, 2, 13, 0, 0).unwrap();
    let outcome = sweep.sweep(now).await.unwrap();
    assert_eq!(outcome.marked_missed, 0);
}

#[tokio::test]
async fn a_row_raced_by_staff_action_is_skipped() {
    let server = MockServer::start().await;
    mount_notification_sinks(&server, 0).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::appointment(APPOINTMENT_ID, PATIENT_ID, TRUCK_ID, "2025-06-01T09:00:00Z", "scheduled")
        ])))
        .mount(&server)
        .await;

    // The guarded update matches nothing: the row was completed between
    // the select and the patch
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let config = TestConfig::with_supabase_url(&server.uri()).to_app_config();
    let sweep = MissedAppointmentSweep::new(&config);

    let now = Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap();
    let outcome = sweep.sweep(now).await.unwrap();
    assert_eq!(outcome.marked_missed, 0);
}
