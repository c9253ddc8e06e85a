use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{Truck, TruckError};

pub struct TruckService {
    supabase: SupabaseClient,
}

impl TruckService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn get_truck(&self, truck_id: Uuid) -> Result<Truck, TruckError> {
        debug!("Fetching truck: {}", truck_id);

        let path = format!("/rest/v1/trucks?id=eq.{}", truck_id);
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            None,
        ).await.map_err(|e| TruckError::DatabaseError(e.to_string()))?;

        let row = result.first().ok_or(TruckError::NotFound)?;

        serde_json::from_value(row.clone())
            .map_err(|e| TruckError::DatabaseError(format!("Failed to parse truck: {}", e)))
    }

    pub async fn list_trucks(&self) -> Result<Vec<Truck>, TruckError> {
        debug!("Listing trucks");

        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            "/rest/v1/trucks?order=license_plate.asc",
            None,
        ).await.map_err(|e| TruckError::DatabaseError(e.to_string()))?;

        result.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Truck>, _>>()
            .map_err(|e| TruckError::DatabaseError(format!("Failed to parse trucks: {}", e)))
    }
}
