//! Weight record entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database row mapping for the weight_records table.
#[derive(Debug, Clone, FromRow)]
pub struct WeightRecordEntity {
    pub id: i64,
    pub hedgehog_id: i64,
    pub weight: f64,
    pub date: DateTime<Utc>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<WeightRecordEntity> for domain::models::WeightRecord {
    fn from(entity: WeightRecordEntity) -> Self {
        Self {
            id: entity.id,
            hedgehog_id: entity.hedgehog_id,
            weight: entity.weight,
            date: entity.date,
            notes: entity.notes,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
