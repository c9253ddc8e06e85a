use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, error, info};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use notification_cell::models::SenderRole;
use notification_cell::services::NotificationDispatchService;

use crate::models::{Appointment, AppointmentError, AppointmentStatus, SweepOutcome};

/// Periodic sweep that turns overdue Scheduled appointments into Missed
/// ones. Only Scheduled rows are selected and each update re-asserts that
/// status, so running the sweep twice produces no second round of side
/// effects: rows already moved to Missed fall out of the query.
pub struct MissedAppointmentSweep {
    supabase: Arc<SupabaseClient>,
    dispatcher: NotificationDispatchService,
}

impl MissedAppointmentSweep {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
            dispatcher: NotificationDispatchService::new(config),
        }
    }

    /// One pass: mark every Scheduled appointment strictly before `now` as
    /// Missed and tell the patient to rebook.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<SweepOutcome, AppointmentError> {
        let overdue = self.overdue_scheduled(now).await?;

        if overdue.is_empty() {
            debug!("Missed-appointment sweep found nothing to do");
            return Ok(SweepOutcome { checked_at: now, marked_missed: 0 });
        }

        let mut marked = 0usize;
        for appointment in &overdue {
            if self.mark_missed(appointment).await? {
                marked += 1;

                let message = format!(
                    "You missed your appointment on {}. Please rebook.",
                    appointment.appointment_date.format("%A, %b %d %Y %H:%M"),
                );
                self.dispatcher
                    .notify(appointment.patient_id, &message, SenderRole::System)
                    .await;
            }
        }

        info!("Missed-appointment sweep marked {} of {} overdue rows", marked, overdue.len());
        Ok(SweepOutcome { checked_at: now, marked_missed: marked })
    }

    /// Hourly loop for the server binary. Runs once immediately, then on
    /// the interval; a failing pass is logged and the loop keeps going.
    pub async fn run_forever(&self, interval: std::time::Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if let Err(e) = self.sweep(Utc::now()).await {
                error!("Missed-appointment sweep failed: {}", e);
            }
        }
    }

    async fn overdue_scheduled(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let cutoff = urlencoding::encode(&now.to_rfc3339()).into_owned();
        let path = format!(
            "/rest/v1/appointments?status=eq.{}&appointment_date=lt.{}&order=appointment_date.asc",
            AppointmentStatus::Scheduled,
            cutoff,
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

    /// Guarded flip to Missed. Returns false when another sweep or a staff
    /// action got to the row first.
    async fn mark_missed(&self, appointment: &Appointment) -> Result<bool, AppointmentError> {
        let update_data = json!({
            "status": AppointmentStatus::Missed,
            "updated_at": Utc::now().to_rfc3339()
        });

        let path = format!(
            "/rest/v1/appointments?id=eq.{}&status=eq.{}",
            appointment.id,
            AppointmentStatus::Scheduled,
        );
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            Some(update_data),
            Some(headers),
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        Ok(!result.is_empty())
    }
}
