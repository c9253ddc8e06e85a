use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, error, info};

use shared_config::AppConfig;

use crate::models::NotificationError;

/// Seam for the external SMS provider so the dispatcher can be exercised
/// against a mock in tests.
#[async_trait]
pub trait SmsGateway: Send + Sync {
    async fn send_sms(&self, to: &str, text: &str) -> Result<(), NotificationError>;
}

/// Infobip SMS API client.
/// Wire contract: POST {base}/sms/2/text/advanced with `App <key>` auth and
/// a `{messages: [{from, destinations: [{to}], text}]}` body.
pub struct InfobipClient {
    client: Client,
    base_url: String,
    api_key: String,
    sender: String,
}

impl InfobipClient {
    /// Gateway calls carry an overall timeout so a stuck provider can
    /// never hold up the caller's transaction.
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(config: &AppConfig) -> Result<Self, NotificationError> {
        if !config.is_sms_configured() {
            return Err(NotificationError::NotConfigured);
        }

        let client = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .build()
            .map_err(|e| NotificationError::GatewayError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.infobip_base_url.clone(),
            api_key: config.infobip_api_key.clone(),
            sender: config.infobip_sender.clone(),
        })
    }
}

#[async_trait]
impl SmsGateway for InfobipClient {
    async fn send_sms(&self, to: &str, text: &str) -> Result<(), NotificationError> {
        let url = format!("{}/sms/2/text/advanced", self.base_url);

        let payload = json!({
            "messages": [
                {
                    "from": self.sender,
                    "destinations": [{ "to": to }],
                    "text": text
                }
            ]
        });

        debug!("Sending SMS to {} via {}", to, url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("App {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotificationError::GatewayError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("SMS gateway rejected message: {} - {}", status, body);
            return Err(NotificationError::GatewayError(format!("HTTP {}: {}", status, body)));
        }

        info!("SMS sent to {}", to);
        Ok(())
    }
}
