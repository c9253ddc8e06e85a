use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub infobip_base_url: String,
    pub infobip_api_key: String,
    pub infobip_sender: String,
    pub sms_country_prefix: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            infobip_base_url: env::var("INFOBIP_BASE_URL")
                .unwrap_or_else(|_| {
                    warn!("INFOBIP_BASE_URL not set, using empty value");
                    String::new()
                }),
            infobip_api_key: env::var("INFOBIP_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("INFOBIP_API_KEY not set, using empty value");
                    String::new()
                }),
            infobip_sender: env::var("INFOBIP_SENDER")
                .unwrap_or_else(|_| {
                    warn!("INFOBIP_SENDER not set, using default");
                    "DialyGo".to_string()
                }),
            sms_country_prefix: env::var("SMS_COUNTRY_PREFIX")
                .unwrap_or_else(|_| {
                    warn!("SMS_COUNTRY_PREFIX not set, using default");
                    "+353".to_string()
                }),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
    }

    pub fn is_sms_configured(&self) -> bool {
        !self.infobip_base_url.is_empty()
            && !self.infobip_api_key.is_empty()
            && !self.infobip_sender.is_empty()
    }
}
