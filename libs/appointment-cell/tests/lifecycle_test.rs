use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::models::{AppointmentError, AppointmentStatus};
use appointment_cell::services::AppointmentLifecycleService;
use assert_matches::assert_matches;
use shared_utils::test_utils::{MockRows, TestConfig};

const PATIENT_ID: &str = "7f3c2a90-1111-4f7e-9b3a-000000000001";
const TRUCK_ID: &str = "7f3c2a90-2222-4f7e-9b3a-000000000002";
const APPOINTMENT_ID: &str = "7f3c2a90-3333-4f7e-9b3a-000000000003";

async fn mount_appointment_with_status(server: &MockServer, status: &str) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::appointment(APPOINTMENT_ID, PATIENT_ID, TRUCK_ID, "2025-06-01T09:00:00Z", status)
        ])))
        .mount(server)
        .await;
}

async fn mount_notification_sinks(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/rest/v1/sms_notifications"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockRows::sms_notification(PATIENT_ID, "update")
        ])))
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
async fn completing_a_scheduled_appointment_records_the_treatment() {
    let server = MockServer::start().await;
    mount_appointment_with_status(&server, "scheduled").await;
    mount_notification_sinks(&server).await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::appointment(APPOINTMENT_ID, PATIENT_ID, TRUCK_ID, "2025-06-01T09:00:00Z", "completed")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    // No treatment record yet, so completion must create exactly one
    Mock::given(method("GET"))
        .and(path("/rest/v1/treatment_records"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/treatment_records"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockRows::treatment_record(PATIENT_ID, APPOINTMENT_ID, "Stable session")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::with_supabase_url(&server.uri()).to_app_config();
    let service = AppointmentLifecycleService::new(&config);

    let appointment = service
        .complete(APPOINTMENT_ID.parse().unwrap(), "Stable session, no complications")
        .await
        .unwrap();
    assert_eq!(appointment.status, AppointmentStatus::Completed);
}

#[tokio::test]
async fn completing_twice_does_not_duplicate_the_treatment_record() {
    let server = MockServer::start().await;
    mount_appointment_with_status(&server, "scheduled").await;
    mount_notification_sinks(&server).await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::appointment(APPOINTMENT_ID, PATIENT_ID, TRUCK_ID, "2025-06-01T09:00:00Z", "completed")
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/treatment_records"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::treatment_record(PATIENT_ID, APPOINTMENT_ID, "Stable session")
        ])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/treatment_records"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let config = TestConfig::with_supabase_url(&server.uri()).to_app_config();
    let service = AppointmentLifecycleService::new(&config);

    let appointment = service
        .complete(APPOINTMENT_ID.parse().unwrap(), "Second write-up")
        .await
        .unwrap();
    assert_eq!(appointment.status, AppointmentStatus::Completed);
}

#[tokio::test]
async fn completion_requires_notes() {
    let server = MockServer::start().await;

    let config = TestConfig::with_supabase_url(&server.uri()).to_app_config();
    let service = AppointmentLifecycleService::new(&config);

    let result = service.complete(Uuid::new_v4(), "   ").await;
    assert_matches!(result, Err(AppointmentError::ValidationError(_)));
}

#[tokio::test]
async fn cancelling_a_scheduled_appointment_succeeds() {
    let server = MockServer::start().await;
    mount_appointment_with_status(&server, "scheduled").await;
    mount_notification_sinks(&server).await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::appointment(APPOINTMENT_ID, PATIENT_ID, TRUCK_ID, "2025-06-01T09:00:00Z", "cancelled")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::with_supabase_url(&server.uri()).to_app_config();
    let service = AppointmentLifecycleService::new(&config);

    let appointment = service.cancel(APPOINTMENT_ID.parse().unwrap()).await.unwrap();
    assert_eq!(appointment.status, AppointmentStatus::Cancelled);
}

#[tokio::test]
async fn each_terminal_state_rejects_cancellation_with_its_own_error() {
    for (status, expected) in [
        ("completed", AppointmentError::AlreadyCompleted),
        ("cancelled", AppointmentError::AlreadyCancelled),
        ("missed", AppointmentError::AlreadyMissed),
    ] {
        let server = MockServer::start().await;
        mount_appointment_with_status(&server, status).await;

        let config = TestConfig::with_supabase_url(&server.uri()).to_app_config();
        let service = AppointmentLifecycleService::new(&config);

        let result = service.cancel(APPOINTMENT_ID.parse().unwrap()).await;
        match result {
            Err(e) => assert_eq!(e.to_string(), expected.to_string()),
            Ok(_) => panic!("cancel of a {} appointment must fail", status),
        }
    }
}

#[tokio::test]
async fn cancelling_a_missing_appointment_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let config = TestConfig::with_supabase_url(&server.uri()).to_app_config();
    let service = AppointmentLifecycleService::new(&config);

    let result = service.cancel(Uuid::new_v4()).await;
    assert_matches!(result, Err(AppointmentError::NotFound));
}
