//! Hedgehog entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use domain::models::HedgehogStatus;

/// Database row mapping for the hedgehogs table.
#[derive(Debug, Clone, FromRow)]
pub struct HedgehogEntity {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub arrival_date: DateTime<Utc>,
    pub status: String,
    pub release_date: Option<DateTime<Utc>>,
    pub area_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<HedgehogEntity> for domain::models::Hedgehog {
    fn from(entity: HedgehogEntity) -> Self {
        let status = entity
            .status
            .parse::<HedgehogStatus>()
            .unwrap_or(HedgehogStatus::InCare);

        Self {
            id: entity.id,
            name: entity.name,
            description: entity.description,
            arrival_date: entity.arrival_date,
            status,
            release_date: entity.release_date,
            area_id: entity.area_id,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(status: &str) -> HedgehogEntity {
        HedgehogEntity {
            id: 4,
            name: "Riccio".to_string(),
            description: "Found in a garden".to_string(),
            arrival_date: Utc::now(),
            status: status.to_string(),
            release_date: None,
            area_id: Some(2),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_entity_to_domain() {
        let hedgehog: domain::models::Hedgehog = entity("recovered").into();
        assert_eq!(hedgehog.id, 4);
        assert_eq!(hedgehog.status, HedgehogStatus::Recovered);
        assert_eq!(hedgehog.area_id, Some(2));
    }

    #[test]
    fn test_unknown_status_falls_back_to_in_care() {
        let hedgehog: domain::models::Hedgehog = entity("???").into();
        assert_eq!(hedgehog.status, HedgehogStatus::InCare);
    }
}
