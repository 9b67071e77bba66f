//! Notification entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use domain::models::{NotificationPriority, NotificationType};

/// Database row mapping for the notifications table.
#[derive(Debug, Clone, FromRow)]
pub struct NotificationEntity {
    pub id: i64,
    #[sqlx(rename = "type")]
    pub notification_type: String,
    pub priority: String,
    pub title: String,
    pub message: String,
    pub hedgehog_id: Option<i64>,
    pub therapy_id: Option<i64>,
    pub data: String,
    pub read: bool,
    pub dismissed: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub action_url: String,
    pub action_label: String,
}

impl From<NotificationEntity> for domain::models::Notification {
    fn from(entity: NotificationEntity) -> Self {
        let notification_type = entity
            .notification_type
            .parse::<NotificationType>()
            .unwrap_or(NotificationType::SystemAlert);

        let priority = entity
            .priority
            .parse::<NotificationPriority>()
            .unwrap_or_default();

        Self {
            id: entity.id,
            notification_type,
            priority,
            title: entity.title,
            message: entity.message,
            hedgehog_id: entity.hedgehog_id,
            therapy_id: entity.therapy_id,
            data: entity.data,
            read: entity.read,
            dismissed: entity.dismissed,
            created_at: entity.created_at,
            expires_at: entity.expires_at,
            action_url: entity.action_url,
            action_label: entity.action_label,
        }
    }
}

/// Aggregated count keyed by a text column.
#[derive(Debug, Clone, FromRow)]
pub struct KeyCountEntity {
    pub key: String,
    pub count: i64,
}

/// Counters over non-dismissed notifications.
#[derive(Debug, Clone, FromRow)]
pub struct NotificationCountsEntity {
    pub total: i64,
    pub unread: i64,
    pub critical: i64,
    pub high: i64,
}

/// Notifications created on one day.
#[derive(Debug, Clone, FromRow)]
pub struct DailyCountEntity {
    pub day: DateTime<Utc>,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(notification_type: &str, priority: &str) -> NotificationEntity {
        NotificationEntity {
            id: 1,
            notification_type: notification_type.to_string(),
            priority: priority.to_string(),
            title: "Weight alert: Spillo".to_string(),
            message: "Significant weight loss: 60.0g in 2 days".to_string(),
            hedgehog_id: Some(3),
            therapy_id: None,
            data: "{}".to_string(),
            read: false,
            dismissed: false,
            created_at: Utc::now(),
            expires_at: None,
            action_url: "/hedgehogs/3".to_string(),
            action_label: "Check weight".to_string(),
        }
    }

    #[test]
    fn test_entity_to_domain() {
        let n: domain::models::Notification = entity("weight_drop", "critical").into();
        assert_eq!(n.notification_type, NotificationType::WeightDrop);
        assert_eq!(n.priority, NotificationPriority::Critical);
        assert_eq!(n.hedgehog_id, Some(3));
    }

    #[test]
    fn test_unknown_values_fall_back() {
        let n: domain::models::Notification = entity("mystery", "urgent").into();
        assert_eq!(n.notification_type, NotificationType::SystemAlert);
        assert_eq!(n.priority, NotificationPriority::Medium);
    }
}
