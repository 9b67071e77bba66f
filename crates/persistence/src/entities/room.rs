//! Room and area entities (database row mappings).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database row mapping for the rooms table.
#[derive(Debug, Clone, FromRow)]
pub struct RoomEntity {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub width: f64,
    pub height: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RoomEntity> for domain::models::Room {
    fn from(entity: RoomEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            description: entity.description,
            width: entity.width,
            height: entity.height,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Database row mapping for the areas table.
#[derive(Debug, Clone, FromRow)]
pub struct AreaEntity {
    pub id: i64,
    pub name: String,
    pub room_id: i64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub max_capacity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AreaEntity> for domain::models::Area {
    fn from(entity: AreaEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            room_id: entity.room_id,
            x: entity.x,
            y: entity.y,
            width: entity.width,
            height: entity.height,
            max_capacity: entity.max_capacity,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
