//! Fan-out of persisted notifications to the external sinks.

use domain::models::{Notification, NotificationSettings};
use shared::time::Clock;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::email::{EmailError, EmailService};
use super::webhook::{WebhookError, WebhookSender};
use crate::middleware::metrics::record_delivery;

/// Hands notifications to the email and webhook sinks enabled in the
/// current settings. Delivery runs on detached tasks; failures are logged
/// and never reported back to the caller.
#[derive(Clone)]
pub struct Dispatcher {
    email: EmailService,
    webhook: WebhookSender,
    settings: watch::Receiver<NotificationSettings>,
    clock: Arc<dyn Clock>,
}

impl Dispatcher {
    pub fn new(
        email: EmailService,
        webhook: WebhookSender,
        settings: watch::Receiver<NotificationSettings>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            email,
            webhook,
            settings,
            clock,
        }
    }

    /// Spawns one task per enabled sink and returns their handles.
    pub fn dispatch(&self, notification: &Notification) -> Vec<JoinHandle<()>> {
        let settings = self.settings.borrow().clone();
        let mut tasks = Vec::new();

        if settings.email_delivery_enabled() {
            let email = self.email.clone();
            let notification = notification.clone();
            let to = settings.email_address.clone();
            tasks.push(tokio::spawn(async move {
                match email.send_notification(&notification, &to).await {
                    Ok(()) => {
                        record_delivery("email", "delivered");
                        info!(notification_id = notification.id, "Notification emailed");
                    }
                    Err(e) => {
                        record_delivery("email", "failed");
                        error!(
                            notification_id = notification.id,
                            error = %e,
                            "Email delivery failed"
                        );
                    }
                }
            }));
        }

        if settings.webhook_delivery_enabled() {
            let webhook = self.webhook.clone();
            let notification = notification.clone();
            let url = settings.webhook_url.clone();
            let now = self.clock.now();
            tasks.push(tokio::spawn(async move {
                match webhook.send(&notification, &url, now).await {
                    Ok(()) => record_delivery("webhook", "delivered"),
                    Err(e) => {
                        record_delivery("webhook", "failed");
                        warn!(
                            notification_id = notification.id,
                            error = %e,
                            "Webhook delivery dropped"
                        );
                    }
                }
            }));
        }

        tasks
    }

    /// Sends a test email to the configured address and waits for the result.
    pub async fn test_email(
        &self,
        notification: &Notification,
        to: &str,
    ) -> Result<(), EmailError> {
        self.email.send_notification(notification, to).await
    }

    /// Posts a test payload to `url` and waits for the result.
    pub async fn test_webhook(
        &self,
        notification: &Notification,
        url: &str,
    ) -> Result<(), WebhookError> {
        self.webhook.send(notification, url, self.clock.now()).await
    }

    pub fn email(&self) -> &EmailService {
        &self.email
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EmailConfig, WebhookConfig};
    use chrono::Utc;
    use domain::models::NewNotification;
    use shared::time::SystemClock;

    fn dispatcher(settings: NotificationSettings) -> Dispatcher {
        let (_tx, rx) = watch::channel(settings);
        Dispatcher::new(
            EmailService::new(EmailConfig::default()),
            WebhookSender::new(&WebhookConfig::default()).unwrap(),
            rx,
            Arc::new(SystemClock),
        )
    }

    fn notification() -> Notification {
        NewNotification::delivery_test("email").into_transient(Utc::now())
    }

    #[tokio::test]
    async fn test_no_sinks_enabled_spawns_nothing() {
        let settings = NotificationSettings::defaults(Utc::now());
        assert!(dispatcher(settings).dispatch(&notification()).is_empty());
    }

    #[tokio::test]
    async fn test_email_toggle_without_address_is_ignored() {
        let mut settings = NotificationSettings::defaults(Utc::now());
        settings.email_notifications_enabled = true;
        assert!(dispatcher(settings).dispatch(&notification()).is_empty());
    }

    #[tokio::test]
    async fn test_email_sink_runs_detached() {
        let mut settings = NotificationSettings::defaults(Utc::now());
        settings.email_notifications_enabled = true;
        settings.email_address = "vet@example.com".to_string();

        let tasks = dispatcher(settings).dispatch(&notification());
        assert_eq!(tasks.len(), 1);
        for task in tasks {
            task.await.unwrap();
        }
    }
}
