//! Daily digest email of recent notifications.

use chrono::Duration;
use domain::models::NotificationSettings;
use domain::services::{NotificationStore, StoreError};
use shared::time::Clock;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::info;

use super::email::{EmailError, EmailService};

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("failed to load notifications: {0}")]
    Store(#[from] StoreError),

    #[error("failed to send summary: {0}")]
    Email(#[from] EmailError),
}

/// What a summary run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryOutcome {
    /// Email delivery is off or has no address.
    Disabled,
    /// Nothing happened in the last 24 hours.
    Empty,
    Sent { notifications: usize },
}

#[derive(Clone)]
pub struct DailySummary {
    notifications: Arc<dyn NotificationStore>,
    email: EmailService,
    settings: watch::Receiver<NotificationSettings>,
    clock: Arc<dyn Clock>,
}

impl DailySummary {
    pub fn new(
        notifications: Arc<dyn NotificationStore>,
        email: EmailService,
        settings: watch::Receiver<NotificationSettings>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            notifications,
            email,
            settings,
            clock,
        }
    }

    /// Emails the non-dismissed notifications of the last 24 hours.
    pub async fn send(&self) -> Result<SummaryOutcome, SummaryError> {
        let settings = self.settings.borrow().clone();
        if !settings.email_delivery_enabled() {
            return Ok(SummaryOutcome::Disabled);
        }

        let now = self.clock.now();
        let mut recent = self
            .notifications
            .created_since(now - Duration::hours(24))
            .await?;
        if recent.is_empty() {
            info!("No notifications to summarize");
            return Ok(SummaryOutcome::Empty);
        }

        recent.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        self.email
            .send_daily_summary(&recent, &settings.email_address, now)
            .await?;

        info!(notifications = recent.len(), "Daily summary sent");
        Ok(SummaryOutcome::Sent {
            notifications: recent.len(),
        })
    }
}
