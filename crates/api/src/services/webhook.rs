//! Webhook delivery of notifications.
//!
//! Each delivery is a JSON POST retried up to `retries` times with a linear
//! backoff. Nothing is persisted about attempts; a delivery that exhausts its
//! attempts is dropped by the caller.

use chrono::{DateTime, SecondsFormat, Utc};
use domain::models::Notification;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::WebhookConfig;
use crate::middleware::metrics::record_webhook_attempt;

pub const WEBHOOK_SOURCE: &str = "notification-system";
pub const SOURCE_HEADER: &str = "X-Rescue-Source";
pub const USER_AGENT: &str = "Hedgehog-Rescue-App/1.0";

#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Webhook responded with status {0}")]
    Status(u16),

    #[error("Webhook delivery failed after {attempts} attempts: {last_error}")]
    Exhausted { attempts: u32, last_error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct WebhookPayload {
    pub source: &'static str,
    /// RFC 3339
    pub timestamp: String,
    pub notification: WebhookNotification,
    pub metadata: WebhookMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct WebhookNotification {
    pub id: i64,
    #[serde(rename = "type")]
    pub notification_type: &'static str,
    pub priority: &'static str,
    pub title: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hedgehog_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub therapy_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_label: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WebhookMetadata {
    pub app_version: &'static str,
    pub environment: String,
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

impl WebhookPayload {
    pub fn new(notification: &Notification, environment: &str, now: DateTime<Utc>) -> Self {
        Self {
            source: WEBHOOK_SOURCE,
            timestamp: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            notification: WebhookNotification {
                id: notification.id,
                notification_type: notification.notification_type.as_str(),
                priority: notification.priority.as_str(),
                title: notification.title.clone(),
                message: notification.message.clone(),
                hedgehog_id: notification.hedgehog_id,
                therapy_id: notification.therapy_id,
                action_url: non_empty(&notification.action_url),
                action_label: non_empty(&notification.action_label),
            },
            metadata: WebhookMetadata {
                app_version: env!("CARGO_PKG_VERSION"),
                environment: environment.to_string(),
            },
        }
    }
}

/// Posts notification payloads to a webhook URL.
#[derive(Clone)]
pub struct WebhookSender {
    client: Client,
    retries: u32,
    backoff: Duration,
    environment: String,
}

impl WebhookSender {
    pub fn new(config: &WebhookConfig) -> Result<Self, WebhookError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            retries: config.retries.max(1),
            backoff: config.backoff(),
            environment: config.environment.clone(),
        })
    }

    /// Delivers one notification, retrying failed attempts. Attempt `n` is
    /// followed by a pause of `n * backoff`.
    pub async fn send(
        &self,
        notification: &Notification,
        url: &str,
        now: DateTime<Utc>,
    ) -> Result<(), WebhookError> {
        let payload = WebhookPayload::new(notification, &self.environment, now);
        let mut last_error = String::new();

        for attempt in 1..=self.retries {
            match self.send_once(url, &payload).await {
                Ok(status) => {
                    info!(
                        notification_id = notification.id,
                        status,
                        attempt,
                        "Webhook delivered"
                    );
                    return Ok(());
                }
                Err(e) => {
                    warn!(
                        notification_id = notification.id,
                        attempt,
                        max_attempts = self.retries,
                        error = %e,
                        "Webhook attempt failed"
                    );
                    last_error = e.to_string();
                }
            }

            if attempt < self.retries {
                tokio::time::sleep(self.backoff * attempt).await;
            }
        }

        Err(WebhookError::Exhausted {
            attempts: self.retries,
            last_error,
        })
    }

    async fn send_once(&self, url: &str, payload: &WebhookPayload) -> Result<u16, WebhookError> {
        record_webhook_attempt();

        let response = self
            .client
            .post(url)
            .header(SOURCE_HEADER, WEBHOOK_SOURCE)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(status.as_u16())
        } else {
            Err(WebhookError::Status(status.as_u16()))
        }
    }
}
