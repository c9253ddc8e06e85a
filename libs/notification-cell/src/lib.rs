pub mod models;
pub mod handlers;
pub mod router;
pub mod services;

pub use models::*;
pub use router::create_notification_router;
pub use services::dispatcher::NotificationDispatchService;
pub use services::infobip::{InfobipClient, SmsGateway};
