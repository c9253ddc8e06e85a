use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

/// A mobile dialysis unit. `capacity` is the number of simultaneous
/// bookings a single time window can hold; a truck without a capacity
/// yields no bookable windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Truck {
    pub id: Uuid,
    pub license_plate: String,
    pub current_location: Option<String>,
    pub capacity: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Truck {
    /// Bookable seats per window. Unset capacity counts as zero rather
    /// than unlimited so that a misconfigured truck can never be
    /// overbooked.
    pub fn effective_capacity(&self) -> i64 {
        self.capacity.map(|c| c.max(0) as i64).unwrap_or(0)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum TruckError {
    #[error("Truck not found")]
    NotFound,

    #[error("Database error: {0}")]
    DatabaseError(String),
}
