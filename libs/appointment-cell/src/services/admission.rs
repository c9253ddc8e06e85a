use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use notification_cell::models::SenderRole;
use notification_cell::services::NotificationDispatchService;
use truck_cell::models::Truck;

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, BookAppointmentRequest, TimeWindow,
};
use crate::services::calendar::SlotCalendarService;

/// Atomic conditional admission of booking requests.
///
/// A plain count-then-insert is a race under concurrent load: two requests
/// can both see the last free seat and both insert. Admission therefore
/// runs the duplicate-day and capacity checks under an advisory lock keyed
/// on (truck, date, window), taken by inserting into a table with a unique
/// `lock_key`, and retries briefly when the lock is contended.
pub struct BookingAdmissionService {
    supabase: Arc<SupabaseClient>,
    calendar: SlotCalendarService,
    dispatcher: NotificationDispatchService,
    lock_timeout_seconds: i64,
    max_retry_attempts: u32,
}

impl BookingAdmissionService {
    pub fn new(config: &AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));
        Self {
            calendar: SlotCalendarService::new(Arc::clone(&supabase)),
            dispatcher: NotificationDispatchService::new(config),
            supabase,
            lock_timeout_seconds: 30,
            max_retry_attempts: 3,
        }
    }

    pub async fn try_book(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        info!(
            "Booking request: patient {} on truck {} at {}",
            request.patient_id, request.truck_id, request.appointment_date
        );

        self.verify_patient_exists(request.patient_id).await?;
        let truck = self.fetch_truck(request.truck_id).await?;

        let window = TimeWindow::containing(request.appointment_date).ok_or_else(|| {
            AppointmentError::InvalidTime(
                "Requested time is outside operating hours (06:00-22:00)".to_string(),
            )
        })?;

        let lock_key = Self::lock_key(request.truck_id, &window);

        for attempt in 1..=self.max_retry_attempts {
            debug!("Admission attempt {} for lock {}", attempt, lock_key);

            match self.try_admit_once(&lock_key, &request, &truck, &window).await {
                Ok(appointment) => {
                    info!(
                        "Appointment {} admitted for patient {} in window {}",
                        appointment.id, appointment.patient_id, window.label()
                    );
                    self.send_confirmation(&appointment, &truck).await;
                    return Ok(appointment);
                }
                Err(AppointmentError::SlotContended) if attempt < self.max_retry_attempts => {
                    warn!(
                        "Lock {} contended, retrying attempt {}/{}",
                        lock_key, attempt, self.max_retry_attempts
                    );
                    tokio::time::sleep(std::time::Duration::from_millis(100 * attempt as u64)).await;
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppointmentError::SlotContended)
    }

    /// One admission pass under the advisory lock. The duplicate-day and
    /// capacity checks and the insert all happen while the lock is held.
    async fn try_admit_once(
        &self,
        lock_key: &str,
        request: &BookAppointmentRequest,
        truck: &Truck,
        window: &TimeWindow,
    ) -> Result<Appointment, AppointmentError> {
        if !self.acquire_booking_lock(lock_key, request.truck_id).await? {
            return Err(AppointmentError::SlotContended);
        }

        let admitted = self.admit_under_lock(request, truck, window).await;

        if let Err(e) = self.release_booking_lock(lock_key).await {
            warn!("Failed to release booking lock {}: {}", lock_key, e);
        }

        admitted
    }

    async fn admit_under_lock(
        &self,
        request: &BookAppointmentRequest,
        truck: &Truck,
        window: &TimeWindow,
    ) -> Result<Appointment, AppointmentError> {
        if self
            .has_booking_on_day(request.patient_id, request.appointment_date.date_naive())
            .await?
        {
            return Err(AppointmentError::DuplicateBookingSameDay);
        }

        let booked = self.calendar.window_booked_count(truck.id, window).await?;
        if booked >= truck.effective_capacity() {
            debug!(
                "Window {} on truck {} is full ({}/{})",
                window.label(), truck.id, booked, truck.effective_capacity()
            );
            return Err(AppointmentError::SlotFull);
        }

        self.insert_appointment(request).await
    }

    /// True when the patient already holds a non-cancelled appointment on
    /// the given calendar day, on any truck.
    async fn has_booking_on_day(
        &self,
        patient_id: Uuid,
        day: NaiveDate,
    ) -> Result<bool, AppointmentError> {
        let day_start = day.and_hms_opt(0, 0, 0).expect("midnight is valid").and_utc();
        let day_end = day_start + Duration::days(1);

        let from_param = urlencoding::encode(&day_start.to_rfc3339()).into_owned();
        let to_param = urlencoding::encode(&day_end.to_rfc3339()).into_owned();

        let path = format!(
            "/rest/v1/appointments?patient_id=eq.{}&status=neq.{}&appointment_date=gte.{}&appointment_date=lt.{}&limit=1",
            patient_id,
            AppointmentStatus::Cancelled,
            from_param,
            to_param,
        );

        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            None,
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        Ok(!result.is_empty())
    }

    async fn insert_appointment(
        &self,
        request: &BookAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let now = Utc::now();
        let appointment_data = json!({
            "patient_id": request.patient_id,
            "truck_id": request.truck_id,
            "appointment_date": request.appointment_date.to_rfc3339(),
            "status": AppointmentStatus::Scheduled,
            "notes": null,
            "created_at": now.to_rfc3339(),
            "updated_at": now.to_rfc3339()
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/appointments",
            Some(appointment_data),
            Some(headers),
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let row = result.first()
            .ok_or_else(|| AppointmentError::DatabaseError("Failed to create appointment".to_string()))?;

        serde_json::from_value(row.clone())
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse created appointment: {}", e)))
    }

    // ==========================================================================
    // ADVISORY LOCKING
    // ==========================================================================

    fn lock_key(truck_id: Uuid, window: &TimeWindow) -> String {
        format!("slot_{}_{}_{}", truck_id, window.date, window.ordinal)
    }

    /// Acquire by inserting a row whose `lock_key` carries a unique
    /// constraint. A failed insert means someone else holds the lock; an
    /// expired holder is cleaned up and acquisition retried once.
    async fn acquire_booking_lock(
        &self,
        lock_key: &str,
        truck_id: Uuid,
    ) -> Result<bool, AppointmentError> {
        match self.try_insert_lock(lock_key, truck_id).await {
            Ok(()) => {
                debug!("Booking lock acquired: {}", lock_key);
                Ok(true)
            }
            Err(_) => {
                if self.cleanup_expired_lock(lock_key).await? {
                    match self.try_insert_lock(lock_key, truck_id).await {
                        Ok(()) => {
                            debug!("Booking lock acquired after cleanup: {}", lock_key);
                            Ok(true)
                        }
                        Err(_) => Ok(false),
                    }
                } else {
                    Ok(false)
                }
            }
        }
    }

    async fn try_insert_lock(&self, lock_key: &str, truck_id: Uuid) -> Result<(), AppointmentError> {
        let now = Utc::now();
        let lock_data = json!({
            "lock_key": lock_key,
            "truck_id": truck_id,
            "acquired_at": now.to_rfc3339(),
            "expires_at": (now + Duration::seconds(self.lock_timeout_seconds)).to_rfc3339(),
            "process_id": format!("booking_{}", Uuid::new_v4())
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let _: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/booking_locks",
            Some(lock_data),
            Some(headers),
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn release_booking_lock(&self, lock_key: &str) -> Result<(), AppointmentError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let _: Vec<Value> = self.supabase.request_with_headers(
            Method::DELETE,
            &format!("/rest/v1/booking_locks?lock_key=eq.{}", lock_key),
            None,
            Some(headers),
        ).await.map_err(|e| AppointmentError::DatabaseError(format!("Lock release failed: {}", e)))?;

        debug!("Booking lock released: {}", lock_key);
        Ok(())
    }

    /// Returns true when an expired lock row was removed and acquisition
    /// is worth retrying.
    async fn cleanup_expired_lock(&self, lock_key: &str) -> Result<bool, AppointmentError> {
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &format!("/rest/v1/booking_locks?lock_key=eq.{}&select=expires_at", lock_key),
            None,
        ).await.map_err(|e| AppointmentError::DatabaseError(format!("Lock check failed: {}", e)))?;

        let Some(expires_at) = result.first()
            .and_then(|lock| lock.get("expires_at"))
            .and_then(|v| v.as_str())
            .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
        else {
            // Row vanished between insert failure and this check
            return Ok(true);
        };

        if expires_at.with_timezone(&Utc) < Utc::now() {
            self.release_booking_lock(lock_key).await?;
            return Ok(true);
        }

        Ok(false)
    }

    // ==========================================================================
    // COLLABORATOR LOOKUPS
    // ==========================================================================

    async fn verify_patient_exists(&self, patient_id: Uuid) -> Result<(), AppointmentError> {
        let path = format!("/rest/v1/patients?id=eq.{}&select=id", patient_id);
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            None,
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(AppointmentError::PatientNotFound);
        }

        Ok(())
    }

    pub(crate) async fn fetch_truck(&self, truck_id: Uuid) -> Result<Truck, AppointmentError> {
        let path = format!("/rest/v1/trucks?id=eq.{}", truck_id);
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            None,
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let row = result.first().ok_or(AppointmentError::TruckNotFound)?;

        serde_json::from_value(row.clone())
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse truck: {}", e)))
    }

    async fn send_confirmation(&self, appointment: &Appointment, truck: &Truck) {
        let message = format!(
            "Your dialysis appointment on {} is confirmed. Truck {} will be at {}.",
            appointment.appointment_date.format("%A, %b %d %Y %H:%M"),
            truck.license_plate,
            truck.current_location.as_deref().unwrap_or("the scheduled stop"),
        );

        self.dispatcher
            .notify(appointment.patient_id, &message, SenderRole::System)
            .await;
    }

    /// Calendar access for handlers that only need schedules.
    pub fn calendar(&self) -> &SlotCalendarService {
        &self.calendar
    }
}
