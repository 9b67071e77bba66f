//! Notification settings entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database row mapping for the notification_settings table.
#[derive(Debug, Clone, FromRow)]
pub struct NotificationSettingsEntity {
    pub id: i64,
    pub therapy_expired_enabled: bool,
    pub therapy_expiring_days: i32,
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

impl From<NotificationSettingsEntity> for domain::models::NotificationSettings {
    fn from(entity: NotificationSettingsEntity) -> Self {
        Self {
            id: entity.id,
            therapy_expired_enabled: entity.therapy_expired_enabled,
            therapy_expiring_days: entity.therapy_expiring_days,
            weight_drop_threshold: entity.weight_drop_threshold,
            weight_drop_days: entity.weight_drop_days,
            weight_stagnation_days: entity.weight_stagnation_days,
            no_weighing_days: entity.no_weighing_days,
            email_notifications_enabled: entity.email_notifications_enabled,
            email_address: entity.email_address,
            webhook_notifications_enabled: entity.webhook_notifications_enabled,
            webhook_url: entity.webhook_url,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
