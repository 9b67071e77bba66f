//! Repository for rooms and areas.

use sqlx::PgPool;

use crate::entities::{AreaEntity, RoomEntity};
use crate::metrics::QueryTimer;

const ROOM_COLUMNS: &str = "id, name, description, width, height, created_at, updated_at";
const AREA_COLUMNS: &str =
    "id, name, room_id, x, y, width, height, max_capacity, created_at, updated_at";

/// Partial room update; `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct RoomChanges<'a> {
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// Input for inserting an area.
#[derive(Debug, Clone)]
pub struct NewArea<'a> {
    pub name: &'a str,
    pub room_id: i64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub max_capacity: i32,
}

/// Partial area update; `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct AreaChanges<'a> {
    pub name: Option<&'a str>,
    pub room_id: Option<i64>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub max_capacity: Option<i32>,
}

/// Repository for room and area database operations.
#[derive(Clone)]
pub struct RoomRepository {
    pool: PgPool,
}

impl RoomRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_rooms(&self) -> Result<Vec<RoomEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_rooms");
        let result = sqlx::query_as::<_, RoomEntity>(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms WHERE deleted_at IS NULL ORDER BY name ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_room(&self, id: i64) -> Result<Option<RoomEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_room_by_id");
        let result = sqlx::query_as::<_, RoomEntity>(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn create_room(
        &self,
        name: &str,
        description: &str,
        width: f64,
        height: f64,
    ) -> Result<RoomEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_room");
        let result = sqlx::query_as::<_, RoomEntity>(&format!(
            r#"
            INSERT INTO rooms (name, description, width, height)
            VALUES ($1, $2, $3, $4)
            RETURNING {ROOM_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(description)
        .bind(width)
        .bind(height)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn update_room(
        &self,
        id: i64,
        changes: RoomChanges<'_>,
    ) -> Result<Option<RoomEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_room");
        let result = sqlx::query_as::<_, RoomEntity>(&format!(
            r#"
            UPDATE rooms SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                width = COALESCE($4, width),
                height = COALESCE($5, height),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {ROOM_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.description)
        .bind(changes.width)
        .bind(changes.height)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Soft-deletes a room together with its areas.
    pub async fn delete_room(&self, id: i64) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_room");
        let mut tx = self.pool.begin().await?;
        sqlx::query("UPDATE areas SET deleted_at = NOW() WHERE room_id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query(
            "UPDATE rooms SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        tx.commit().await?;
        timer.record();
        Ok(deleted > 0)
    }

    pub async fn list_areas(&self, room_id: Option<i64>) -> Result<Vec<AreaEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_areas");
        let result = sqlx::query_as::<_, AreaEntity>(&format!(
            r#"
            SELECT {AREA_COLUMNS}
            FROM areas
            WHERE deleted_at IS NULL AND ($1::BIGINT IS NULL OR room_id = $1)
            ORDER BY room_id ASC, name ASC, id ASC
            "#
        ))
        .bind(room_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn create_area(&self, input: NewArea<'_>) -> Result<AreaEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_area");
        let result = sqlx::query_as::<_, AreaEntity>(&format!(
            r#"
            INSERT INTO areas (name, room_id, x, y, width, height, max_capacity)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {AREA_COLUMNS}
            "#
        ))
        .bind(input.name)
        .bind(input.room_id)
        .bind(input.x)
        .bind(input.y)
        .bind(input.width)
        .bind(input.height)
        .bind(input.max_capacity)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn update_area(
        &self,
        id: i64,
        changes: AreaChanges<'_>,
    ) -> Result<Option<AreaEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_area");
        let result = sqlx::query_as::<_, AreaEntity>(&format!(
            r#"
            UPDATE areas SET
                name = COALESCE($2, name),
                room_id = COALESCE($3, room_id),
                x = COALESCE($4, x),
                y = COALESCE($5, y),
                width = COALESCE($6, width),
                height = COALESCE($7, height),
                max_capacity = COALESCE($8, max_capacity),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {AREA_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.room_id)
        .bind(changes.x)
        .bind(changes.y)
        .bind(changes.width)
        .bind(changes.height)
        .bind(changes.max_capacity)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn delete_area(&self, id: i64) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_area");
        let result = sqlx::query(
            "UPDATE areas SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }
}
