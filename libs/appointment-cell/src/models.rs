use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Timelike, Utc};
use std::fmt;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub truck_id: Uuid,
    pub appointment_date: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn calendar_day(&self) -> NaiveDate {
        self.appointment_date.date_naive()
    }
}

/// The single status enum and transition table for the whole system.
/// Every handler goes through `valid_transitions`, so there is exactly one
/// place that knows Scheduled is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
    Missed,
}

impl AppointmentStatus {
    pub fn valid_transitions(&self) -> &'static [AppointmentStatus] {
        match self {
            AppointmentStatus::Scheduled => &[
                AppointmentStatus::Completed,
                AppointmentStatus::Cancelled,
                AppointmentStatus::Missed,
            ],
            // Terminal states - re-booking creates a new appointment
            AppointmentStatus::Completed => &[],
            AppointmentStatus::Cancelled => &[],
            AppointmentStatus::Missed => &[],
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::Missed => write!(f, "missed"),
        }
    }
}

// ==============================================================================
// TIME WINDOWS
// ==============================================================================

/// A truck's operating day is partitioned into four fixed 4-hour bands
/// starting at 06:00. Windows are derived from appointment timestamps on
/// every query and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub date: NaiveDate,
    pub ordinal: usize,
}

impl TimeWindow {
    pub const BAND_START_HOURS: [u32; 4] = [6, 10, 14, 18];
    pub const BAND_LENGTH_HOURS: u32 = 4;

    pub fn for_date(date: NaiveDate) -> Vec<TimeWindow> {
        (0..Self::BAND_START_HOURS.len())
            .map(|ordinal| TimeWindow { date, ordinal })
            .collect()
    }

    /// The window a timestamp falls in, or `None` outside operating hours.
    pub fn containing(timestamp: DateTime<Utc>) -> Option<TimeWindow> {
        let date = timestamp.date_naive();
        let hour = timestamp.time().hour();

        Self::BAND_START_HOURS
            .iter()
            .position(|&start| hour >= start && hour < start + Self::BAND_LENGTH_HOURS)
            .map(|ordinal| TimeWindow { date, ordinal })
    }

    pub fn start(&self) -> DateTime<Utc> {
        let hour = Self::BAND_START_HOURS[self.ordinal];
        self.date
            .and_hms_opt(hour, 0, 0)
            .expect("band start is a valid time of day")
            .and_utc()
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.start() + chrono::Duration::hours(Self::BAND_LENGTH_HOURS as i64)
    }

    /// "HH:MM-HH:MM", the wire format the booking frontend parses.
    pub fn label(&self) -> String {
        format!(
            "{}-{}",
            self.start().format("%H:%M"),
            self.end().format("%H:%M")
        )
    }
}

/// One row of a truck's day schedule: a window plus how many live
/// (non-cancelled) bookings already sit inside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowOccupancy {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub booked_count: i64,
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub patient_id: Uuid,
    pub truck_id: Uuid,
    pub appointment_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteAppointmentRequest {
    pub notes: String,
}

// ==============================================================================
// TREATMENT RECORDS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreatmentRecord {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub appointment_id: Uuid,
    pub diagnosis: Option<String>,
    pub details: Option<String>,
    pub treatment_date: Option<DateTime<Utc>>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Patient not found")]
    PatientNotFound,

    #[error("Truck not found")]
    TruckNotFound,

    #[error("Patient already has an appointment on this day")]
    DuplicateBookingSameDay,

    #[error("This time slot is fully booked")]
    SlotFull,

    #[error("Slot is being booked by another request, please retry")]
    SlotContended,

    #[error("Appointment is already completed")]
    AlreadyCompleted,

    #[error("Appointment is already cancelled")]
    AlreadyCancelled,

    #[error("Appointment was missed and can no longer be changed")]
    AlreadyMissed,

    #[error("Invalid appointment time: {0}")]
    InvalidTime(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

// ==============================================================================
// SWEEP RESULTS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepOutcome {
    pub checked_at: DateTime<Utc>,
    pub marked_missed: usize,
}
