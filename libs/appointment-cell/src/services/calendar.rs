use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_database::supabase::SupabaseClient;
use truck_cell::models::Truck;

use crate::models::{Appointment, AppointmentError, AppointmentStatus, TimeWindow, WindowOccupancy};

/// Computes the fixed time windows of a truck's operating day and how many
/// live bookings each already holds. Occupancy is always recomputed from
/// appointment rows; nothing here is cached or persisted.
pub struct SlotCalendarService {
    supabase: Arc<SupabaseClient>,
}

impl SlotCalendarService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    /// The full ordered day schedule for a truck: every window with its
    /// booked count, whether available or not.
    pub async fn day_schedule(
        &self,
        truck_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<WindowOccupancy>, AppointmentError> {
        let windows = TimeWindow::for_date(date);
        let day_start = windows.first().map(|w| w.start()).unwrap_or_default();
        let day_end = windows.last().map(|w| w.end()).unwrap_or_default();

        let appointments = self
            .active_appointments_in_range(truck_id, day_start, day_end)
            .await?;

        let schedule = windows
            .into_iter()
            .map(|window| {
                let booked_count = appointments
                    .iter()
                    .filter(|a| a.appointment_date >= window.start() && a.appointment_date < window.end())
                    .count() as i64;

                WindowOccupancy {
                    window_start: window.start(),
                    window_end: window.end(),
                    booked_count,
                }
            })
            .collect();

        Ok(schedule)
    }

    /// Windows with remaining capacity, as "HH:MM-HH:MM" labels. A truck
    /// without a configured capacity gets an empty list.
    pub async fn available_windows(
        &self,
        truck: &Truck,
        date: NaiveDate,
    ) -> Result<Vec<String>, AppointmentError> {
        let capacity = truck.effective_capacity();
        if capacity == 0 {
            debug!("Truck {} has no capacity configured, no windows offered", truck.id);
            return Ok(Vec::new());
        }

        let schedule = self.day_schedule(truck.id, date).await?;
        let windows = TimeWindow::for_date(date);

        Ok(schedule
            .iter()
            .zip(windows.iter())
            .filter(|(occupancy, _)| occupancy.booked_count < capacity)
            .map(|(_, window)| window.label())
            .collect())
    }

    /// Live bookings inside one window, used by admission control for the
    /// capacity re-check under lock.
    pub async fn window_booked_count(
        &self,
        truck_id: Uuid,
        window: &TimeWindow,
    ) -> Result<i64, AppointmentError> {
        let appointments = self
            .active_appointments_in_range(truck_id, window.start(), window.end())
            .await?;
        Ok(appointments.len() as i64)
    }

    async fn active_appointments_in_range(
        &self,
        truck_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let from_param = urlencoding::encode(&from.to_rfc3339()).into_owned();
        let to_param = urlencoding::encode(&to.to_rfc3339()).into_owned();

        let path = format!(
            "/rest/v1/appointments?truck_id=eq.{}&status=neq.{}&appointment_date=gte.{}&appointment_date=lt.{}&order=appointment_date.asc",
            truck_id,
            AppointmentStatus::Cancelled,
            from_param,
            to_param,
        );

        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            None,
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        result.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Appointment>, _>>()
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointments: {}", e)))
    }
}
