//! Notification domain model.
//!
//! Notifications are produced by the rule evaluators, deduplicated per
//! hedgehog and type, and fanned out to the configured delivery sinks.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Lifetime assigned to every notification that does not carry its own expiry.
pub const NOTIFICATION_TTL_DAYS: i64 = 30;

/// Read notifications older than this are removed by the cleanup sweep.
pub const READ_RETENTION_DAYS: i64 = 30;

/// Default page size for notification listings.
pub const DEFAULT_LIST_LIMIT: i64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    TherapyExpired,
    TherapyExpiring,
    WeightDrop,
    WeightStagnation,
    NoWeighing,
    HedgehogRecovered,
    SystemAlert,
}

impl NotificationType {
    pub const ALL: [NotificationType; 7] = [
        NotificationType::TherapyExpired,
        NotificationType::TherapyExpiring,
        NotificationType::WeightDrop,
        NotificationType::WeightStagnation,
        NotificationType::NoWeighing,
        NotificationType::HedgehogRecovered,
        NotificationType::SystemAlert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::TherapyExpired => "therapy_expired",
            NotificationType::TherapyExpiring => "therapy_expiring",
            NotificationType::WeightDrop => "weight_drop",
            NotificationType::WeightStagnation => "weight_stagnation",
            NotificationType::NoWeighing => "no_weighing",
            NotificationType::HedgehogRecovered => "hedgehog_recovered",
            NotificationType::SystemAlert => "system_alert",
        }
    }

    /// Window within which a second notification of this type for the same
    /// hedgehog is suppressed.
    pub fn dedup_window(&self) -> Duration {
        match self {
            NotificationType::NoWeighing => Duration::hours(48),
            _ => Duration::hours(24),
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NotificationType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown notification type: {}", s))
    }
}

/// Notification priority. Variant order is the severity order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl NotificationPriority {
    pub const ALL: [NotificationPriority; 4] = [
        NotificationPriority::Low,
        NotificationPriority::Medium,
        NotificationPriority::High,
        NotificationPriority::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationPriority::Low => "low",
            NotificationPriority::Medium => "medium",
            NotificationPriority::High => "high",
            NotificationPriority::Critical => "critical",
        }
    }

    /// Numeric rank used for ordering in storage queries.
    pub fn rank(&self) -> i32 {
        match self {
            NotificationPriority::Low => 0,
            NotificationPriority::Medium => 1,
            NotificationPriority::High => 2,
            NotificationPriority::Critical => 3,
        }
    }
}

impl std::fmt::Display for NotificationPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotificationPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NotificationPriority::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("Unknown notification priority: {}", s))
    }
}

/// A persisted notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: i64,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub priority: NotificationPriority,
    pub title: String,
    pub message: String,
    pub hedgehog_id: Option<i64>,
    pub therapy_id: Option<i64>,
    /// Opaque JSON payload produced by the evaluator.
    pub data: String,
    pub read: bool,
    pub dismissed: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub action_url: String,
    pub action_label: String,
}

impl Notification {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at < now)
    }
}

/// A notification ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub notification_type: NotificationType,
    pub priority: NotificationPriority,
    pub title: String,
    pub message: String,
    pub hedgehog_id: Option<i64>,
    pub therapy_id: Option<i64>,
    pub data: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub action_url: String,
    pub action_label: String,
}

impl NewNotification {
    /// Fills in the default expiry relative to `now` if none was set.
    pub fn with_default_expiry(mut self, now: DateTime<Utc>) -> Self {
        if self.expires_at.is_none() {
            self.expires_at = Some(now + Duration::days(NOTIFICATION_TTL_DAYS));
        }
        self
    }

    /// Builds the unsaved notification used by the delivery test endpoints.
    pub fn delivery_test(channel: &str) -> Self {
        NewNotification {
            notification_type: NotificationType::SystemAlert,
            priority: NotificationPriority::Medium,
            title: format!("Test notification ({})", channel),
            message: format!(
                "This is a test message to verify the {} delivery configuration.",
                channel
            ),
            hedgehog_id: None,
            therapy_id: None,
            data: "{}".to_string(),
            expires_at: None,
            action_url: "/notifications".to_string(),
            action_label: "Open notifications".to_string(),
        }
    }

    /// Materializes the notification without persisting it.
    pub fn into_transient(self, now: DateTime<Utc>) -> Notification {
        Notification {
            id: 0,
            notification_type: self.notification_type,
            priority: self.priority,
            title: self.title,
            message: self.message,
            hedgehog_id: self.hedgehog_id,
            therapy_id: self.therapy_id,
            data: self.data,
            read: false,
            dismissed: false,
            created_at: now,
            expires_at: self.expires_at,
            action_url: self.action_url,
            action_label: self.action_label,
        }
    }
}

/// Query parameters for listing notifications.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationQuery {
    /// Only `true` filters; `false` or absence returns read and unread.
    pub unread: Option<bool>,
    pub priority: Option<NotificationPriority>,
    #[serde(rename = "type")]
    pub notification_type: Option<NotificationType>,
    pub limit: Option<i64>,
}

impl NotificationQuery {
    pub fn unread_only(&self) -> bool {
        self.unread == Some(true)
    }

    pub fn effective_limit(&self) -> i64 {
        match self.limit {
            Some(limit) if limit > 0 => limit,
            _ => DEFAULT_LIST_LIMIT,
        }
    }

    /// Whether a notification passes the filters. Dismissed notifications never do.
    pub fn matches(&self, notification: &Notification) -> bool {
        if notification.dismissed {
            return false;
        }
        if self.unread_only() && notification.read {
            return false;
        }
        if self.priority.is_some_and(|p| p != notification.priority) {
            return false;
        }
        if self
            .notification_type
            .is_some_and(|t| t != notification.notification_type)
        {
            return false;
        }
        true
    }
}

/// Counters over non-dismissed notifications.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NotificationStats {
    pub total: i64,
    pub unread: i64,
    pub critical: i64,
    pub high: i64,
    pub by_type: BTreeMap<String, i64>,
}

/// Notifications created on one calendar day (UTC).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyCount {
    pub date: String,
    pub count: i64,
}

/// Creation volume over the last week.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NotificationAnalytics {
    pub last_24_hours: i64,
    pub last_week: i64,
    pub by_type: BTreeMap<String, i64>,
    pub by_priority: BTreeMap<String, i64>,
    pub trend_data: Vec<DailyCount>,
}

/// Start of each of the last seven UTC days, oldest first, ending with today.
pub fn trend_day_starts(now: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    let today = now.date_naive();
    (0..7)
        .rev()
        .filter_map(|offset| {
            let day = today - Duration::days(offset);
            day.and_hms_opt(0, 0, 0).map(|start| start.and_utc())
        })
        .collect()
}
