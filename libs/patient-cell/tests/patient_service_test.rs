use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use assert_matches::assert_matches;
use patient_cell::models::{PatientError, RegisterPatientRequest, UpdateMedicalHistoryRequest};
use patient_cell::services::PatientService;
use shared_utils::test_utils::{MockRows, TestConfig};

const PATIENT_ID: &str = "7f3c2a90-1111-4f7e-9b3a-000000000001";

fn register_request() -> RegisterPatientRequest {
    RegisterPatientRequest {
        name: "Aoife Kelly".to_string(),
        gender: "female".to_string(),
        date_of_birth: None,
        phone_number: Some("0871234567".to_string()),
        email: None,
        address: None,
        medical_history: Some("CKD stage 5".to_string()),
    }
}

#[tokio::test]
async fn registers_a_patient() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockRows::patient(PATIENT_ID, "Aoife Kelly", "0871234567")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::with_supabase_url(&server.uri()).to_app_config();
    let service = PatientService::new(&config);

    let patient = service.register_patient(register_request()).await.unwrap();
    assert_eq!(patient.name, "Aoife Kelly");
}

#[tokio::test]
async fn registration_requires_a_name() {
    let server = MockServer::start().await;

    let config = TestConfig::with_supabase_url(&server.uri()).to_app_config();
    let service = PatientService::new(&config);

    let mut request = register_request();
    request.name = "  ".to_string();

    let result = service.register_patient(request).await;
    assert_matches!(result, Err(PatientError::ValidationError(_)));
}

#[tokio::test]
async fn medical_history_update_attaches_treatment_to_latest_appointment() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::patient(PATIENT_ID, "Aoife Kelly", "0871234567")
        ])))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::patient(PATIENT_ID, "Aoife Kelly", "0871234567")
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::appointment(
                &Uuid::new_v4().to_string(),
                PATIENT_ID,
                &Uuid::new_v4().to_string(),
                "2025-06-01T09:00:00Z",
                "completed",
            )
        ])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/treatment_records"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockRows::treatment_record(PATIENT_ID, &Uuid::new_v4().to_string(), "Fluid overload")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::with_supabase_url(&server.uri()).to_app_config();
    let service = PatientService::new(&config);

    let request = UpdateMedicalHistoryRequest {
        diagnosis: Some("Fluid overload".to_string()),
        treatment_details: Some("Extra ultrafiltration prescribed".to_string()),
    };

    service.update_medical_history(PATIENT_ID.parse().unwrap(), request).await.unwrap();
}

#[tokio::test]
async fn treatment_update_without_appointment_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::patient(PATIENT_ID, "Aoife Kelly", "0871234567")
        ])))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::patient(PATIENT_ID, "Aoife Kelly", "0871234567")
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let config = TestConfig::with_supabase_url(&server.uri()).to_app_config();
    let service = PatientService::new(&config);

    let request = UpdateMedicalHistoryRequest {
        diagnosis: None,
        treatment_details: Some("Extra ultrafiltration prescribed".to_string()),
    };

    let result = service.update_medical_history(PATIENT_ID.parse().unwrap(), request).await;
    assert_matches!(result, Err(PatientError::NoAppointment));
}
