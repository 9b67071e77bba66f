//! Notification settings domain model (singleton row).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_THERAPY_EXPIRING_DAYS: i32 = 3;
pub const DEFAULT_WEIGHT_DROP_THRESHOLD: f64 = 50.0;
pub const DEFAULT_WEIGHT_DROP_DAYS: i32 = 7;
pub const DEFAULT_WEIGHT_STAGNATION_DAYS: i32 = 14;
pub const DEFAULT_NO_WEIGHING_DAYS: i32 = 7;

/// Thresholds for the rule evaluators and toggles for the delivery sinks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationSettings {
    pub id: i64,
    pub therapy_expired_enabled: bool,
    pub therapy_expiring_days: i32,
    /// Grams.
    pub weight_drop_threshold: f64,
    pub weight_drop_days: i32,
    pub weight_stagnation_days: i32,
    pub no_weighing_days: i32,
    pub email_notifications_enabled: bool,
    pub email_address: String,
    pub webhook_notifications_enabled: bool,
    pub webhook_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NotificationSettings {
    /// Settings used when no row exists yet.
    pub fn defaults(now: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            therapy_expired_enabled: true,
            therapy_expiring_days: DEFAULT_THERAPY_EXPIRING_DAYS,
            weight_drop_threshold: DEFAULT_WEIGHT_DROP_THRESHOLD,
            weight_drop_days: DEFAULT_WEIGHT_DROP_DAYS,
            weight_stagnation_days: DEFAULT_WEIGHT_STAGNATION_DAYS,
            no_weighing_days: DEFAULT_NO_WEIGHING_DAYS,
            email_notifications_enabled: false,
            email_address: String::new(),
            webhook_notifications_enabled: false,
            webhook_url: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn therapy_expiring_window(&self) -> Duration {
        Duration::days(i64::from(self.therapy_expiring_days))
    }

    pub fn stagnation_window(&self) -> Duration {
        Duration::days(i64::from(self.weight_stagnation_days))
    }

    pub fn no_weighing_window(&self) -> Duration {
        Duration::days(i64::from(self.no_weighing_days))
    }

    /// Email delivery needs both the toggle and an address.
    pub fn email_delivery_enabled(&self) -> bool {
        self.email_notifications_enabled && !self.email_address.trim().is_empty()
    }

    /// Webhook delivery needs both the toggle and a URL.
    pub fn webhook_delivery_enabled(&self) -> bool {
        self.webhook_notifications_enabled && !self.webhook_url.trim().is_empty()
    }

    /// Applies a validated partial update.
    pub fn apply(&mut self, update: UpdateNotificationSettingsRequest) {
        if let Some(v) = update.therapy_expired_enabled {
            self.therapy_expired_enabled = v;
        }
        if let Some(v) = update.therapy_expiring_days {
            self.therapy_expiring_days = v;
        }
        if let Some(v) = update.weight_drop_threshold {
            self.weight_drop_threshold = v;
        }
        if let Some(v) = update.weight_drop_days {
            self.weight_drop_days = v;
        }
        if let Some(v) = update.weight_stagnation_days {
            self.weight_stagnation_days = v;
        }
        if let Some(v) = update.no_weighing_days {
            self.no_weighing_days = v;
        }
        if let Some(v) = update.email_notifications_enabled {
            self.email_notifications_enabled = v;
        }
        if let Some(v) = update.email_address {
            self.email_address = v;
        }
        if let Some(v) = update.webhook_notifications_enabled {
            self.webhook_notifications_enabled = v;
        }
        if let Some(v) = update.webhook_url {
            self.webhook_url = v;
        }
    }
}

/// Request payload for updating the settings. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateNotificationSettingsRequest {
    pub therapy_expired_enabled: Option<bool>,

    #[validate(range(min = 1, max = 365, message = "Must be between 1 and 365 days"))]
    pub therapy_expiring_days: Option<i32>,

    #[validate(range(
        min = 1.0,
        max = 5000.0,
        message = "Threshold must be between 1 and 5000 grams"
    ))]
    pub weight_drop_threshold: Option<f64>,

    #[validate(range(min = 1, max = 365, message = "Must be between 1 and 365 days"))]
    pub weight_drop_days: Option<i32>,

    #[validate(range(min = 1, max = 365, message = "Must be between 1 and 365 days"))]
    pub weight_stagnation_days: Option<i32>,

    #[validate(range(min = 1, max = 365, message = "Must be between 1 and 365 days"))]
    pub no_weighing_days: Option<i32>,

    pub email_notifications_enabled: Option<bool>,

    #[validate(custom(function = "validate_email_address"))]
    pub email_address: Option<String>,

    pub webhook_notifications_enabled: Option<bool>,

    #[validate(custom(function = "validate_webhook_url"))]
    pub webhook_url: Option<String>,
}

fn validate_email_address(value: &str) -> Result<(), validator::ValidationError> {
    shared::validation::validate_optional_email(value.trim())
}

fn validate_webhook_url(value: &str) -> Result<(), validator::ValidationError> {
    shared::validation::validate_optional_webhook_url(value.trim())
}
