//! Storage abstractions used by the notification engine.
//!
//! The Postgres implementations live in the persistence crate; an in-memory
//! implementation is provided in [`super::memory`] for development and tests.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{
    Hedgehog, NewNotification, Notification, NotificationAnalytics, NotificationQuery,
    NotificationSettings, NotificationStats, NotificationType, TherapyWithHedgehog, WeightRecord,
};

/// Errors raised by a store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0} not found")]
    NotFound(String),
}

/// Read access to the care records the rule evaluators consume.
#[async_trait::async_trait]
pub trait CareRecords: Send + Sync {
    /// Hedgehogs whose status is `in_care`.
    async fn hedgehogs_in_care(&self) -> Result<Vec<Hedgehog>, StoreError>;

    /// Active therapies joined with their hedgehog name.
    async fn active_therapies(&self) -> Result<Vec<TherapyWithHedgehog>, StoreError>;

    /// Most recent weighings for a hedgehog, newest first.
    async fn recent_weights(
        &self,
        hedgehog_id: i64,
        limit: i64,
    ) -> Result<Vec<WeightRecord>, StoreError>;
}

/// Persistence of notifications.
#[async_trait::async_trait]
pub trait NotificationStore: Send + Sync {
    /// Whether a non-dismissed notification of this type exists for the
    /// hedgehog with `created_at > since`.
    async fn has_recent(
        &self,
        hedgehog_id: Option<i64>,
        notification_type: NotificationType,
        since: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Inserts a notification created at `now`.
    async fn insert(
        &self,
        notification: NewNotification,
        now: DateTime<Utc>,
    ) -> Result<Notification, StoreError>;

    /// Hard-deletes notifications whose expiry has passed.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;

    /// Hard-deletes read notifications created before `cutoff`.
    async fn delete_read_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError>;

    /// Non-dismissed notifications matching the query, highest priority first
    /// then newest first.
    async fn list(&self, query: &NotificationQuery) -> Result<Vec<Notification>, StoreError>;

    /// Sets the read flag. Returns `None` when the notification does not exist.
    async fn mark_read(&self, id: i64) -> Result<Option<Notification>, StoreError>;

    /// Sets the dismissed flag. Returns false when the notification does not exist.
    async fn dismiss(&self, id: i64) -> Result<bool, StoreError>;

    async fn stats(&self) -> Result<NotificationStats, StoreError>;

    /// Non-dismissed notifications created at or after `since`, newest first.
    async fn created_since(&self, since: DateTime<Utc>) -> Result<Vec<Notification>, StoreError>;

    async fn analytics(&self, now: DateTime<Utc>) -> Result<NotificationAnalytics, StoreError>;
}

/// Persistence of the singleton settings row.
#[async_trait::async_trait]
pub trait SettingsStore: Send + Sync {
    /// Loads the settings, inserting the defaults if no row exists.
    async fn get_or_create(&self, now: DateTime<Utc>) -> Result<NotificationSettings, StoreError>;

    /// Persists the settings and returns the stored row.
    async fn update(
        &self,
        settings: &NotificationSettings,
        now: DateTime<Utc>,
    ) -> Result<NotificationSettings, StoreError>;
}
