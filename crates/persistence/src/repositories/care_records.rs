//! Postgres-backed read model for the rule evaluators.

use sqlx::PgPool;

use domain::models::{Hedgehog, TherapyWithHedgehog, WeightRecord};
use domain::services::{CareRecords, StoreError};

use super::{HedgehogRepository, TherapyRepository, WeightRecordRepository};

/// Combines the hedgehog, therapy and weight repositories behind [`CareRecords`].
#[derive(Clone)]
pub struct PgCareRecords {
    hedgehogs: HedgehogRepository,
    therapies: TherapyRepository,
    weights: WeightRecordRepository,
}

impl PgCareRecords {
    pub fn new(pool: PgPool) -> Self {
        Self {
            hedgehogs: HedgehogRepository::new(pool.clone()),
            therapies: TherapyRepository::new(pool.clone()),
            weights: WeightRecordRepository::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl CareRecords for PgCareRecords {
    async fn hedgehogs_in_care(&self) -> Result<Vec<Hedgehog>, StoreError> {
        let rows = self.hedgehogs.list_in_care().await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn active_therapies(&self) -> Result<Vec<TherapyWithHedgehog>, StoreError> {
        let rows = self.therapies.list_active().await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn recent_weights(
        &self,
        hedgehog_id: i64,
        limit: i64,
    ) -> Result<Vec<WeightRecord>, StoreError> {
        let rows = self.weights.recent_for_hedgehog(hedgehog_id, limit).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
