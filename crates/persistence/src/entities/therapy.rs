//! Therapy entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use domain::models::TherapyStatus;

/// Database row mapping for the therapies table.
#[derive(Debug, Clone, FromRow)]
pub struct TherapyEntity {
    pub id: i64,
    pub hedgehog_id: i64,
    pub name: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TherapyEntity> for domain::models::Therapy {
    fn from(entity: TherapyEntity) -> Self {
        let status = entity
            .status
            .parse::<TherapyStatus>()
            .unwrap_or(TherapyStatus::Active);

        Self {
            id: entity.id,
            hedgehog_id: entity.hedgehog_id,
            name: entity.name,
            description: entity.description,
            start_date: entity.start_date,
            end_date: entity.end_date,
            status,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Therapy row joined with the name of its (non-deleted) hedgehog.
#[derive(Debug, Clone, FromRow)]
pub struct TherapyWithHedgehogEntity {
    #[sqlx(flatten)]
    pub therapy: TherapyEntity,
    pub hedgehog_name: Option<String>,
}

impl From<TherapyWithHedgehogEntity> for domain::models::TherapyWithHedgehog {
    fn from(entity: TherapyWithHedgehogEntity) -> Self {
        Self {
            therapy: entity.therapy.into(),
            hedgehog_name: entity.hedgehog_name,
        }
    }
}
