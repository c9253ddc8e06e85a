use std::sync::Arc;
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub infobip_base_url: String,
    pub infobip_api_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            infobip_base_url: "http://localhost:8081".to_string(),
            infobip_api_key: "test-infobip-key".to_string(),
        }
    }
}

impl TestConfig {
    /// Point the database client at a wiremock server.
    pub fn with_supabase_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Default::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            infobip_base_url: self.infobip_base_url.clone(),
            infobip_api_key: self.infobip_api_key.clone(),
            infobip_sender: "DialyGo".to_string(),
            sms_country_prefix: "+353".to_string(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

/// Canned PostgREST row payloads for wiremock-backed tests.
pub struct MockRows;

impl MockRows {
    pub fn patient(id: &str, name: &str, phone: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "gender": "female",
            "date_of_birth": "1961-04-02",
            "phone_number": phone,
            "email": format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            "address": "12 Harbour Road",
            "medical_history": "CKD stage 5",
            "created_at": "2025-01-06T09:00:00Z",
            "updated_at": "2025-01-06T09:00:00Z"
        })
    }

    pub fn truck(id: &str, plate: &str, capacity: Option<i32>) -> Value {
        json!({
            "id": id,
            "license_plate": plate,
            "current_location": "Galway",
            "capacity": capacity,
            "created_at": "2025-01-06T09:00:00Z",
            "updated_at": "2025-01-06T09:00:00Z"
        })
    }

    pub fn appointment(
        id: &str,
        patient_id: &str,
        truck_id: &str,
        appointment_date: &str,
        status: &str,
    ) -> Value {
        json!({
            "id": id,
            "patient_id": patient_id,
            "truck_id": truck_id,
            "appointment_date": appointment_date,
            "status": status,
            "notes": null,
            "created_at": "2025-01-06T09:00:00Z",
            "updated_at": "2025-01-06T09:00:00Z"
        })
    }

    pub fn sms_notification(patient_id: &str, message: &str) -> Value {
        json!({
            "id": Uuid::new_v4().to_string(),
            "patient_id": patient_id,
            "message": message,
            "sent_at": Utc::now().to_rfc3339(),
            "sent_by": "System",
            "sender_role": "system"
        })
    }

    pub fn treatment_record(patient_id: &str, appointment_id: &str, diagnosis: &str) -> Value {
        json!({
            "id": Uuid::new_v4().to_string(),
            "patient_id": patient_id,
            "appointment_id": appointment_id,
            "diagnosis": diagnosis,
            "details": "Dialysis session completed",
            "treatment_date": Utc::now().to_rfc3339()
        })
    }
}
