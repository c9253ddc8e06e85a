pub mod admission;
pub mod calendar;
pub mod lifecycle;
pub mod sweep;
pub mod treatment;

pub use admission::BookingAdmissionService;
pub use calendar::SlotCalendarService;
pub use lifecycle::AppointmentLifecycleService;
pub use sweep::MissedAppointmentSweep;
pub use treatment::TreatmentRecordService;
