use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use assert_matches::assert_matches;
use shared_utils::test_utils::{MockRows, TestConfig};
use truck_cell::models::TruckError;
use truck_cell::services::TruckService;

const TRUCK_ID: &str = "7f3c2a90-2222-4f7e-9b3a-000000000002";

#[tokio::test]
async fn fetches_a_truck_by_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/trucks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::truck(TRUCK_ID, "241-G-1234", Some(3))
        ])))
        .mount(&server)
        .await;

    let config = TestConfig::with_supabase_url(&server.uri()).to_app_config();
    let service = TruckService::new(&config);

    let truck = service.get_truck(TRUCK_ID.parse().unwrap()).await.unwrap();
    assert_eq!(truck.license_plate, "241-G-1234");
    assert_eq!(truck.effective_capacity(), 3);
}

#[tokio::test]
async fn missing_truck_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/trucks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let config = TestConfig::with_supabase_url(&server.uri()).to_app_config();
    let service = TruckService::new(&config);

    let result = service.get_truck(Uuid::new_v4()).await;
    assert_matches!(result, Err(TruckError::NotFound));
}

#[tokio::test]
async fn unset_capacity_counts_as_zero() {
    let truck: truck_cell::models::Truck =
        serde_json::from_value(MockRows::truck(TRUCK_ID, "241-G-1234", None)).unwrap();
    assert_eq!(truck.effective_capacity(), 0);
}
