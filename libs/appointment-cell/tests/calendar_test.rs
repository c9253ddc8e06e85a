use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::services::SlotCalendarService;
use shared_database::supabase::SupabaseClient;
use shared_utils::test_utils::{MockRows, TestConfig};
use truck_cell::models::Truck;

const TRUCK_ID: &str = "7f3c2a90-2222-4f7e-9b3a-000000000002";

fn truck(capacity: Option<i32>) -> Truck {
    serde_json::from_value(MockRows::truck(TRUCK_ID, "241-G-1234", capacity)).unwrap()
}

fn calendar(server: &MockServer) -> SlotCalendarService {
    let config = TestConfig::with_supabase_url(&server.uri()).to_app_config();
    SlotCalendarService::new(Arc::new(SupabaseClient::new(&config)))
}

#[tokio::test]
async fn day_schedule_buckets_bookings_into_their_windows() {
    let server = MockServer::start().await;

    // Two bookings in the morning band, one in the evening band
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::appointment(&Uuid::new_v4().to_string(), &Uuid::new_v4().to_string(), TRUCK_ID, "2025-06-01T06:30:00Z", "scheduled"),
            MockRows::appointment(&Uuid::new_v4().to_string(), &Uuid::new_v4().to_string(), TRUCK_ID, "2025-06-01T09:00:00Z", "scheduled"),
            MockRows::appointment(&Uuid::new_v4().to_string(), &Uuid::new_v4().to_string(), TRUCK_ID, "2025-06-01T18:15:00Z", "scheduled"),
        ])))
        .mount(&server)
        .await;

    let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    let schedule = calendar(&server).day_schedule(TRUCK_ID.parse().unwrap(), date).await.unwrap();

    assert_eq!(schedule.len(), 4);
    assert_eq!(
        schedule.iter().map(|w| w.booked_count).collect::<Vec<_>>(),
        vec![2, 0, 0, 1]
    );
}

#[tokio::test]
async fn full_windows_are_not_offered() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::appointment(&Uuid::new_v4().to_string(), &Uuid::new_v4().to_string(), TRUCK_ID, "2025-06-01T09:00:00Z", "scheduled"),
        ])))
        .mount(&server)
        .await;

    let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    let windows = calendar(&server)
        .available_windows(&truck(Some(1)), date)
        .await
        .unwrap();

    assert_eq!(windows, vec!["10:00-14:00", "14:00-18:00", "18:00-22:00"]);
}

#[tokio::test]
async fn unset_capacity_means_no_availability() {
    let server = MockServer::start().await;

    let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    let windows = calendar(&server)
        .available_windows(&truck(None), date)
        .await
        .unwrap();

    assert!(windows.is_empty());
}
