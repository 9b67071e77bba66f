//! Repository for the singleton notification settings row.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use domain::models::NotificationSettings;
use domain::services::{SettingsStore, StoreError};

use crate::entities::NotificationSettingsEntity;
use crate::metrics::QueryTimer;

const SETTINGS_COLUMNS: &str = "id, therapy_expired_enabled, therapy_expiring_days, \
                                weight_drop_threshold, weight_drop_days, weight_stagnation_days, \
                                no_weighing_days, email_notifications_enabled, email_address, \
                                webhook_notifications_enabled, webhook_url, created_at, updated_at";

/// Repository for notification settings database operations.
#[derive(Clone)]
pub struct NotificationSettingsRepository {
    pool: PgPool,
}

impl NotificationSettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns None if the settings row does not exist yet.
    pub async fn get(&self) -> Result<Option<NotificationSettingsEntity>, sqlx::Error> {
        sqlx::query_as::<_, NotificationSettingsEntity>(&format!(
            "SELECT {SETTINGS_COLUMNS} FROM notification_settings WHERE singleton = TRUE"
        ))
        .fetch_optional(&self.pool)
        .await
    }

    /// Inserts the default row. Concurrent callers converge on the same row.
    pub async fn create_default(&self) -> Result<NotificationSettingsEntity, sqlx::Error> {
        sqlx::query_as::<_, NotificationSettingsEntity>(&format!(
            r#"
            INSERT INTO notification_settings (singleton)
            VALUES (TRUE)
            ON CONFLICT (singleton) DO UPDATE SET updated_at = notification_settings.updated_at
            RETURNING {SETTINGS_COLUMNS}
            "#
        ))
        .fetch_one(&self.pool)
        .await
    }

    /// Writes every field. Creates the row if it does not exist.
    pub async fn upsert(
        &self,
        settings: &NotificationSettings,
    ) -> Result<NotificationSettingsEntity, sqlx::Error> {
        sqlx::query_as::<_, NotificationSettingsEntity>(&format!(
            r#"
            INSERT INTO notification_settings (
                singleton, therapy_expired_enabled, therapy_expiring_days,
                weight_drop_threshold, weight_drop_days, weight_stagnation_days,
                no_weighing_days, email_notifications_enabled, email_address,
                webhook_notifications_enabled, webhook_url
            )
            VALUES (TRUE, $1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (singleton) DO UPDATE SET
                therapy_expired_enabled = EXCLUDED.therapy_expired_enabled,
                therapy_expiring_days = EXCLUDED.therapy_expiring_days,
                weight_drop_threshold = EXCLUDED.weight_drop_threshold,
                weight_drop_days = EXCLUDED.weight_drop_days,
                weight_stagnation_days = EXCLUDED.weight_stagnation_days,
                no_weighing_days = EXCLUDED.no_weighing_days,
                email_notifications_enabled = EXCLUDED.email_notifications_enabled,
                email_address = EXCLUDED.email_address,
                webhook_notifications_enabled = EXCLUDED.webhook_notifications_enabled,
                webhook_url = EXCLUDED.webhook_url,
                updated_at = NOW()
            RETURNING {SETTINGS_COLUMNS}
            "#
        ))
        .bind(settings.therapy_expired_enabled)
        .bind(settings.therapy_expiring_days)
        .bind(settings.weight_drop_threshold)
        .bind(settings.weight_drop_days)
        .bind(settings.weight_stagnation_days)
        .bind(settings.no_weighing_days)
        .bind(settings.email_notifications_enabled)
        .bind(&settings.email_address)
        .bind(settings.webhook_notifications_enabled)
        .bind(&settings.webhook_url)
        .fetch_one(&self.pool)
        .await
    }
}

#[async_trait::async_trait]
impl SettingsStore for NotificationSettingsRepository {
    async fn get_or_create(&self, _now: DateTime<Utc>) -> Result<NotificationSettings, StoreError> {
        let timer = QueryTimer::new("get_or_create_notification_settings");
        let entity = match self.get().await? {
            Some(existing) => existing,
            None => {
                tracing::info!("Creating default notification settings");
                self.create_default().await?
            }
        };
        timer.record();
        Ok(entity.into())
    }

    async fn update(
        &self,
        settings: &NotificationSettings,
        _now: DateTime<Utc>,
    ) -> Result<NotificationSettings, StoreError> {
        let timer = QueryTimer::new("update_notification_settings");
        let result = self.upsert(settings).await;
        timer.record();
        Ok(result?.into())
    }
}
