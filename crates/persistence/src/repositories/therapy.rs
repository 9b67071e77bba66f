//! Repository for therapies.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::entities::{TherapyEntity, TherapyWithHedgehogEntity};
use crate::metrics::QueryTimer;

const THERAPY_COLUMNS: &str = "id, hedgehog_id, name, description, start_date, end_date, \
                               status, created_at, updated_at";

/// Input for inserting a therapy.
#[derive(Debug, Clone)]
pub struct NewTherapy<'a> {
    pub hedgehog_id: i64,
    pub name: &'a str,
    pub description: &'a str,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: &'a str,
}

/// Partial update; `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct TherapyChanges<'a> {
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: Option<&'a str>,
}

/// Repository for therapy database operations.
#[derive(Clone)]
pub struct TherapyRepository {
    pool: PgPool,
}

impl TherapyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists therapies with their hedgehog name, optionally for one hedgehog.
    pub async fn list(
        &self,
        hedgehog_id: Option<i64>,
    ) -> Result<Vec<TherapyWithHedgehogEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_therapies");
        let result = sqlx::query_as::<_, TherapyWithHedgehogEntity>(
            r#"
            SELECT t.id, t.hedgehog_id, t.name, t.description, t.start_date, t.end_date,
                   t.status, t.created_at, t.updated_at, h.name AS hedgehog_name
            FROM therapies t
            LEFT JOIN hedgehogs h ON h.id = t.hedgehog_id AND h.deleted_at IS NULL
            WHERE t.deleted_at IS NULL AND ($1::BIGINT IS NULL OR t.hedgehog_id = $1)
            ORDER BY t.start_date DESC, t.id DESC
            "#,
        )
        .bind(hedgehog_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Active therapies with their hedgehog name. The name is absent when the
    /// hedgehog has been deleted.
    pub async fn list_active(&self) -> Result<Vec<TherapyWithHedgehogEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_active_therapies");
        let result = sqlx::query_as::<_, TherapyWithHedgehogEntity>(
            r#"
            SELECT t.id, t.hedgehog_id, t.name, t.description, t.start_date, t.end_date,
                   t.status, t.created_at, t.updated_at, h.name AS hedgehog_name
            FROM therapies t
            LEFT JOIN hedgehogs h ON h.id = t.hedgehog_id AND h.deleted_at IS NULL
            WHERE t.deleted_at IS NULL AND t.status = 'active'
            ORDER BY t.end_date ASC NULLS LAST, t.id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn create(&self, input: NewTherapy<'_>) -> Result<TherapyEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_therapy");
        let result = sqlx::query_as::<_, TherapyEntity>(&format!(
            r#"
            INSERT INTO therapies (hedgehog_id, name, description, start_date, end_date, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {THERAPY_COLUMNS}
            "#
        ))
        .bind(input.hedgehog_id)
        .bind(input.name)
        .bind(input.description)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(input.status)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn update(
        &self,
        id: i64,
        changes: TherapyChanges<'_>,
    ) -> Result<Option<TherapyEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_therapy");
        let result = sqlx::query_as::<_, TherapyEntity>(&format!(
            r#"
            UPDATE therapies SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                start_date = COALESCE($4, start_date),
                end_date = COALESCE($5, end_date),
                status = COALESCE($6, status),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {THERAPY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.description)
        .bind(changes.start_date)
        .bind(changes.end_date)
        .bind(changes.status)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn soft_delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("soft_delete_therapy");
        let result = sqlx::query(
            "UPDATE therapies SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }
}
