pub mod dispatcher;
pub mod infobip;

pub use dispatcher::NotificationDispatchService;
pub use infobip::{InfobipClient, SmsGateway};
