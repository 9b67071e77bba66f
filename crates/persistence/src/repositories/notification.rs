//! Repository for notifications.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use std::collections::{BTreeMap, HashMap};

use domain::models::notification::trend_day_starts;
use domain::models::{
    DailyCount, NewNotification, Notification, NotificationAnalytics, NotificationQuery,
    NotificationStats, NotificationType,
};
use domain::services::{NotificationStore, StoreError};

use crate::entities::{
    DailyCountEntity, KeyCountEntity, NotificationCountsEntity, NotificationEntity,
};
use crate::metrics::{record_notifications_purged, QueryTimer};

const NOTIFICATION_COLUMNS: &str = "id, type, priority, title, message, hedgehog_id, therapy_id, \
                                    data, read, dismissed, created_at, expires_at, action_url, \
                                    action_label";

/// Orders priorities by severity instead of by their text value.
const PRIORITY_RANK: &str = "CASE priority \
                             WHEN 'critical' THEN 3 \
                             WHEN 'high' THEN 2 \
                             WHEN 'medium' THEN 1 \
                             ELSE 0 END";

/// Repository for notification database operations.
#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn counts_by(
        &self,
        column: &str,
        since: DateTime<Utc>,
    ) -> Result<BTreeMap<String, i64>, sqlx::Error> {
        let rows = sqlx::query_as::<_, KeyCountEntity>(&format!(
            r#"
            SELECT {column} AS key, COUNT(*) AS count
            FROM notifications
            WHERE created_at >= $1
            GROUP BY {column}
            "#
        ))
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|r| (r.key, r.count)).collect())
    }

    async fn count_since(&self, since: DateTime<Utc>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM notifications WHERE created_at >= $1")
            .bind(since)
            .fetch_one(&self.pool)
            .await
    }
}

#[async_trait::async_trait]
impl NotificationStore for NotificationRepository {
    async fn has_recent(
        &self,
        hedgehog_id: Option<i64>,
        notification_type: NotificationType,
        since: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let timer = QueryTimer::new("has_recent_notification");
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM notifications
                WHERE hedgehog_id IS NOT DISTINCT FROM $1
                  AND type = $2
                  AND created_at > $3
                  AND dismissed = FALSE
            )
            "#,
        )
        .bind(hedgehog_id)
        .bind(notification_type.as_str())
        .bind(since)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        Ok(result?)
    }

    async fn insert(
        &self,
        notification: NewNotification,
        now: DateTime<Utc>,
    ) -> Result<Notification, StoreError> {
        let timer = QueryTimer::new("insert_notification");
        let result = sqlx::query_as::<_, NotificationEntity>(&format!(
            r#"
            INSERT INTO notifications (
                type, priority, title, message, hedgehog_id, therapy_id, data,
                created_at, expires_at, action_url, action_label
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {NOTIFICATION_COLUMNS}
            "#
        ))
        .bind(notification.notification_type.as_str())
        .bind(notification.priority.as_str())
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.hedgehog_id)
        .bind(notification.therapy_id)
        .bind(&notification.data)
        .bind(now)
        .bind(notification.expires_at)
        .bind(&notification.action_url)
        .bind(&notification.action_label)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        Ok(result?.into())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let timer = QueryTimer::new("delete_expired_notifications");
        let result = sqlx::query("DELETE FROM notifications WHERE expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await;
        timer.record();
        let deleted = result?.rows_affected();
        record_notifications_purged("expired", deleted);
        Ok(deleted)
    }

    async fn delete_read_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let timer = QueryTimer::new("delete_old_read_notifications");
        let result =
            sqlx::query("DELETE FROM notifications WHERE read = TRUE AND created_at < $1")
                .bind(cutoff)
                .execute(&self.pool)
                .await;
        timer.record();
        let deleted = result?.rows_affected();
        record_notifications_purged("read", deleted);
        Ok(deleted)
    }

    async fn list(&self, query: &NotificationQuery) -> Result<Vec<Notification>, StoreError> {
        let timer = QueryTimer::new("list_notifications");
        let result = sqlx::query_as::<_, NotificationEntity>(&format!(
            r#"
            SELECT {NOTIFICATION_COLUMNS}
            FROM notifications
            WHERE dismissed = FALSE
              AND ($1 = FALSE OR read = FALSE)
              AND ($2::TEXT IS NULL OR priority = $2)
              AND ($3::TEXT IS NULL OR type = $3)
            ORDER BY {PRIORITY_RANK} DESC, created_at DESC
            LIMIT $4
            "#
        ))
        .bind(query.unread_only())
        .bind(query.priority.map(|p| p.as_str()))
        .bind(query.notification_type.map(|t| t.as_str()))
        .bind(query.effective_limit())
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result?.into_iter().map(Into::into).collect())
    }

    async fn mark_read(&self, id: i64) -> Result<Option<Notification>, StoreError> {
        let timer = QueryTimer::new("mark_notification_read");
        let result = sqlx::query_as::<_, NotificationEntity>(&format!(
            r#"
            UPDATE notifications SET read = TRUE
            WHERE id = $1
            RETURNING {NOTIFICATION_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result?.map(Into::into))
    }

    async fn dismiss(&self, id: i64) -> Result<bool, StoreError> {
        let timer = QueryTimer::new("dismiss_notification");
        let result = sqlx::query("UPDATE notifications SET dismissed = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    async fn stats(&self) -> Result<NotificationStats, StoreError> {
        let timer = QueryTimer::new("notification_stats");
        let counts = sqlx::query_as::<_, NotificationCountsEntity>(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE read = FALSE) AS unread,
                   COUNT(*) FILTER (WHERE priority = 'critical') AS critical,
                   COUNT(*) FILTER (WHERE priority = 'high') AS high
            FROM notifications
            WHERE dismissed = FALSE
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let by_type = sqlx::query_as::<_, KeyCountEntity>(
            r#"
            SELECT type AS key, COUNT(*) AS count
            FROM notifications
            WHERE dismissed = FALSE
            GROUP BY type
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        timer.record();

        Ok(NotificationStats {
            total: counts.total,
            unread: counts.unread,
            critical: counts.critical,
            high: counts.high,
            by_type: by_type.into_iter().map(|r| (r.key, r.count)).collect(),
        })
    }

    async fn created_since(&self, since: DateTime<Utc>) -> Result<Vec<Notification>, StoreError> {
        let timer = QueryTimer::new("notifications_created_since");
        let result = sqlx::query_as::<_, NotificationEntity>(&format!(
            r#"
            SELECT {NOTIFICATION_COLUMNS}
            FROM notifications
            WHERE dismissed = FALSE AND created_at >= $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(since)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result?.into_iter().map(Into::into).collect())
    }

    async fn analytics(&self, now: DateTime<Utc>) -> Result<NotificationAnalytics, StoreError> {
        let timer = QueryTimer::new("notification_analytics");
        let week_ago = now - Duration::days(7);
        let days = trend_day_starts(now);
        let first_day = days.first().copied().unwrap_or(week_ago);

        let last_24_hours = self.count_since(now - Duration::days(1)).await?;
        let last_week = self.count_since(week_ago).await?;
        let by_type = self.counts_by("type", week_ago).await?;
        let by_priority = self.counts_by("priority", week_ago).await?;

        let daily = sqlx::query_as::<_, DailyCountEntity>(
            r#"
            SELECT date_trunc('day', created_at, 'UTC') AS day, COUNT(*) AS count
            FROM notifications
            WHERE created_at >= $1
            GROUP BY 1
            "#,
        )
        .bind(first_day)
        .fetch_all(&self.pool)
        .await?;
        timer.record();

        let by_day: HashMap<DateTime<Utc>, i64> =
            daily.into_iter().map(|d| (d.day, d.count)).collect();
        let trend_data = days
            .into_iter()
            .map(|start| DailyCount {
                date: start.format("%Y-%m-%d").to_string(),
                count: by_day.get(&start).copied().unwrap_or(0),
            })
            .collect();

        Ok(NotificationAnalytics {
            last_24_hours,
            last_week,
            by_type,
            by_priority,
            trend_data,
        })
    }
}
