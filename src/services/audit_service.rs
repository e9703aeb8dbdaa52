use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AuditSettings;

/// Audit event types sent to the external log sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    Supply,
    Borrow,
    BorrowBlocked,
    Repay,
    Simulate,
    BuildTransaction,
    ExecuteTransaction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: Uuid,
    pub event_type: AuditEventType,
    pub network: String,
    pub message: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl AuditEvent {
    pub fn new(event_type: AuditEventType, network: &str, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type,
            network: network.to_string(),
            message: message.into(),
            timestamp: chrono::Utc::now(),
        }
    }
}

/// Fire-and-forget delivery of audit events; failures never reach the caller
#[derive(Clone)]
pub struct AuditLogger {
    client: Option<reqwest::Client>,
    url: String,
}

impl AuditLogger {
    pub fn new(settings: &AuditSettings) -> Self {
        if !settings.enabled {
            return Self::disabled();
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client: Some(client),
            url: settings.logger_url.clone(),
        }
    }

    pub fn disabled() -> Self {
        Self {
            client: None,
            url: String::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    /// Log locally and schedule delivery to the sink
    pub fn record(&self, event: AuditEvent) -> Option<JoinHandle<()>> {
        info!(
            audit_id = %event.id,
            event_type = ?event.event_type,
            network = %event.network,
            "{}",
            event.message
        );

        if !self.is_enabled() {
            return None;
        }

        let logger = self.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = logger.deliver(&event).await {
                warn!(audit_id = %event.id, error = %e, "Audit log delivery failed");
            }
        }))
    }

    pub async fn deliver(&self, event: &AuditEvent) -> Result<(), reqwest::Error> {
        let Some(client) = &self.client else {
            return Ok(());
        };

        client
            .post(&self.url)
            .json(&json!({ "log_message": event.message }))
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}
