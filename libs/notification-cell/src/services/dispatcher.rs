use std::sync::Arc;

use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_utils::normalize_phone;

use crate::models::{NotificationError, SenderRole, SmsNotification};
use crate::services::infobip::{InfobipClient, SmsGateway};

/// Best-effort SMS dispatch with a durable attempt log.
///
/// The log row is appended before the gateway is contacted, and no gateway
/// outcome ever propagates to the caller: lifecycle transitions commit
/// first, messaging is strictly an afterthought.
pub struct NotificationDispatchService {
    supabase: Arc<SupabaseClient>,
    gateway: Option<Arc<dyn SmsGateway>>,
    country_prefix: String,
}

impl NotificationDispatchService {
    pub fn new(config: &AppConfig) -> Self {
        let gateway: Option<Arc<dyn SmsGateway>> = match InfobipClient::new(config) {
            Ok(client) => Some(Arc::new(client)),
            Err(_) => {
                warn!("SMS gateway not configured, notifications will be logged only");
                None
            }
        };

        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
            gateway,
            country_prefix: config.sms_country_prefix.clone(),
        }
    }

    /// Swap the gateway implementation, used by tests.
    pub fn with_gateway(config: &AppConfig, gateway: Arc<dyn SmsGateway>) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
            gateway: Some(gateway),
            country_prefix: config.sms_country_prefix.clone(),
        }
    }

    /// Log the attempt and try to deliver. Never fails toward the caller:
    /// a dead gateway, a missing phone number, even a failed log write are
    /// all absorbed here.
    pub async fn notify(&self, patient_id: Uuid, message: &str, sender_role: SenderRole) {
        if let Err(e) = self.append_log_row(patient_id, message, sender_role).await {
            warn!("Failed to log SMS notification for patient {}: {}", patient_id, e);
        }

        let phone = match self.patient_phone(patient_id).await {
            Ok(Some(phone)) => phone,
            Ok(None) => {
                warn!("Patient {} has no usable phone number, skipping SMS", patient_id);
                return;
            }
            Err(e) => {
                warn!("Could not resolve phone number for patient {}: {}", patient_id, e);
                return;
            }
        };

        let Some(gateway) = &self.gateway else {
            debug!("No SMS gateway configured, notification for patient {} logged only", patient_id);
            return;
        };

        if let Err(e) = gateway.send_sms(&phone, message).await {
            warn!("SMS sending failed for patient {}: {}", patient_id, e);
        }
    }

    pub async fn list_for_patient(
        &self,
        patient_id: Uuid,
    ) -> Result<Vec<SmsNotification>, NotificationError> {
        let path = format!(
            "/rest/v1/sms_notifications?patient_id=eq.{}&order=sent_at.desc",
            patient_id
        );
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            None,
        ).await.map_err(|e| NotificationError::DatabaseError(e.to_string()))?;

        result.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<SmsNotification>, _>>()
            .map_err(|e| NotificationError::DatabaseError(format!("Failed to parse notifications: {}", e)))
    }

    pub async fn list_all(&self) -> Result<Vec<SmsNotification>, NotificationError> {
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            "/rest/v1/sms_notifications?order=sent_at.desc",
            None,
        ).await.map_err(|e| NotificationError::DatabaseError(e.to_string()))?;

        result.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<SmsNotification>, _>>()
            .map_err(|e| NotificationError::DatabaseError(format!("Failed to parse notifications: {}", e)))
    }

    /// Direct gateway send for staff tooling. Unlike `notify`, gateway
    /// failures are surfaced so the operator sees the real outcome.
    pub async fn send_direct(&self, phone_number: &str, message: &str) -> Result<(), NotificationError> {
        let gateway = self.gateway.as_ref().ok_or(NotificationError::NotConfigured)?;

        let phone = normalize_phone(phone_number, &self.country_prefix)
            .ok_or_else(|| NotificationError::ValidationError("Invalid phone number".to_string()))?;

        gateway.send_sms(&phone, message).await
    }

    async fn append_log_row(
        &self,
        patient_id: Uuid,
        message: &str,
        sender_role: SenderRole,
    ) -> Result<(), NotificationError> {
        let row = json!({
            "patient_id": patient_id,
            "message": message,
            "sent_at": Utc::now().to_rfc3339(),
            "sent_by": sender_role.label(),
            "sender_role": sender_role
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let _: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/sms_notifications",
            Some(row),
            Some(headers),
        ).await.map_err(|e| NotificationError::DatabaseError(e.to_string()))?;

        debug!("Logged SMS notification for patient {}", patient_id);
        Ok(())
    }

    async fn patient_phone(&self, patient_id: Uuid) -> Result<Option<String>, NotificationError> {
        let path = format!("/rest/v1/patients?id=eq.{}&select=phone_number", patient_id);
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            None,
        ).await.map_err(|e| NotificationError::DatabaseError(e.to_string()))?;

        let raw = result.first()
            .and_then(|row| row.get("phone_number"))
            .and_then(|v| v.as_str());

        Ok(raw.and_then(|r| normalize_phone(r, &self.country_prefix)))
    }
}
