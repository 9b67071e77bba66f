//! Repository for hedgehog records.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::entities::HedgehogEntity;
use crate::metrics::QueryTimer;

const HEDGEHOG_COLUMNS: &str = "id, name, description, arrival_date, status, release_date, \
                                area_id, created_at, updated_at";

/// Input for inserting a hedgehog.
#[derive(Debug, Clone)]
pub struct NewHedgehog<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub arrival_date: DateTime<Utc>,
    pub status: &'a str,
    pub release_date: Option<DateTime<Utc>>,
    pub area_id: Option<i64>,
}

/// Partial update; `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct HedgehogChanges<'a> {
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub arrival_date: Option<DateTime<Utc>>,
    pub status: Option<&'a str>,
    pub release_date: Option<DateTime<Utc>>,
    pub area_id: Option<i64>,
}

/// Repository for hedgehog database operations.
#[derive(Clone)]
pub struct HedgehogRepository {
    pool: PgPool,
}

impl HedgehogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists non-deleted hedgehogs, optionally filtered by status.
    pub async fn list(&self, status: Option<&str>) -> Result<Vec<HedgehogEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_hedgehogs");
        let result = sqlx::query_as::<_, HedgehogEntity>(&format!(
            r#"
            SELECT {HEDGEHOG_COLUMNS}
            FROM hedgehogs
            WHERE deleted_at IS NULL AND ($1::TEXT IS NULL OR status = $1)
            ORDER BY name ASC, id ASC
            "#
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<HedgehogEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_hedgehog_by_id");
        let result = sqlx::query_as::<_, HedgehogEntity>(&format!(
            r#"
            SELECT {HEDGEHOG_COLUMNS}
            FROM hedgehogs
            WHERE id = $1 AND deleted_at IS NULL
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn create(&self, input: NewHedgehog<'_>) -> Result<HedgehogEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_hedgehog");
        let result = sqlx::query_as::<_, HedgehogEntity>(&format!(
            r#"
            INSERT INTO hedgehogs (name, description, arrival_date, status, release_date, area_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {HEDGEHOG_COLUMNS}
            "#
        ))
        .bind(input.name)
        .bind(input.description)
        .bind(input.arrival_date)
        .bind(input.status)
        .bind(input.release_date)
        .bind(input.area_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Applies a partial update. Returns `None` when the hedgehog does not exist.
    pub async fn update(
        &self,
        id: i64,
        changes: HedgehogChanges<'_>,
    ) -> Result<Option<HedgehogEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_hedgehog");
        let result = sqlx::query_as::<_, HedgehogEntity>(&format!(
            r#"
            UPDATE hedgehogs SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                arrival_date = COALESCE($4, arrival_date),
                status = COALESCE($5, status),
                release_date = COALESCE($6, release_date),
                area_id = COALESCE($7, area_id),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {HEDGEHOG_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.description)
        .bind(changes.arrival_date)
        .bind(changes.status)
        .bind(changes.release_date)
        .bind(changes.area_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Soft-deletes a hedgehog. Notifications referencing it are kept.
    pub async fn soft_delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("soft_delete_hedgehog");
        let result = sqlx::query(
            r#"
            UPDATE hedgehogs SET deleted_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    pub async fn list_in_care(&self) -> Result<Vec<HedgehogEntity>, sqlx::Error> {
        self.list(Some("in_care")).await
    }
}
