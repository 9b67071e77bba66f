//! Repository for weight records.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::entities::WeightRecordEntity;
use crate::metrics::QueryTimer;

const WEIGHT_COLUMNS: &str = "id, hedgehog_id, weight, date, notes, created_at, updated_at";

/// Partial update; `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct WeightRecordChanges<'a> {
    pub weight: Option<f64>,
    pub date: Option<DateTime<Utc>>,
    pub notes: Option<&'a str>,
}

/// Repository for weight record database operations.
#[derive(Clone)]
pub struct WeightRecordRepository {
    pool: PgPool,
}

impl WeightRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists weighings newest first, optionally for one hedgehog.
    pub async fn list(
        &self,
        hedgehog_id: Option<i64>,
    ) -> Result<Vec<WeightRecordEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_weight_records");
        let result = sqlx::query_as::<_, WeightRecordEntity>(&format!(
            r#"
            SELECT {WEIGHT_COLUMNS}
            FROM weight_records
            WHERE deleted_at IS NULL AND ($1::BIGINT IS NULL OR hedgehog_id = $1)
            ORDER BY date DESC, id DESC
            "#
        ))
        .bind(hedgehog_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Most recent weighings for a hedgehog, newest first.
    pub async fn recent_for_hedgehog(
        &self,
        hedgehog_id: i64,
        limit: i64,
    ) -> Result<Vec<WeightRecordEntity>, sqlx::Error> {
        let timer = QueryTimer::new("recent_weight_records");
        let result = sqlx::query_as::<_, WeightRecordEntity>(&format!(
            r#"
            SELECT {WEIGHT_COLUMNS}
            FROM weight_records
            WHERE hedgehog_id = $1 AND deleted_at IS NULL
            ORDER BY date DESC, id DESC
            LIMIT $2
            "#
        ))
        .bind(hedgehog_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn create(
        &self,
        hedgehog_id: i64,
        weight: f64,
        date: DateTime<Utc>,
        notes: &str,
    ) -> Result<WeightRecordEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_weight_record");
        let result = sqlx::query_as::<_, WeightRecordEntity>(&format!(
            r#"
            INSERT INTO weight_records (hedgehog_id, weight, date, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING {WEIGHT_COLUMNS}
            "#
        ))
        .bind(hedgehog_id)
        .bind(weight)
        .bind(date)
        .bind(notes)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn update(
        &self,
        id: i64,
        changes: WeightRecordChanges<'_>,
    ) -> Result<Option<WeightRecordEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_weight_record");
        let result = sqlx::query_as::<_, WeightRecordEntity>(&format!(
            r#"
            UPDATE weight_records SET
                weight = COALESCE($2, weight),
                date = COALESCE($3, date),
                notes = COALESCE($4, notes),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {WEIGHT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.weight)
        .bind(changes.date)
        .bind(changes.notes)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn soft_delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("soft_delete_weight_record");
        let result = sqlx::query(
            "UPDATE weight_records SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }
}
