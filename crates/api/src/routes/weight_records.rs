//! Weight record endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{
    CreateWeightRecordRequest, ListWeightRecordsQuery, UpdateWeightRecordRequest, WeightRecord,
};
use persistence::repositories::{HedgehogRepository, WeightRecordChanges, WeightRecordRepository};
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::SweepScope;

/// GET /api/weight-records
pub async fn list_weight_records(
    State(state): State<AppState>,
    Query(query): Query<ListWeightRecordsQuery>,
) -> Result<Json<Vec<WeightRecord>>, ApiError> {
    let repo = WeightRecordRepository::new(state.pool.clone());
    let records = repo.list(query.hedgehog_id).await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

/// POST /api/weight-records
///
/// Queues a weight recheck once the record is stored.
pub async fn create_weight_record(
    State(state): State<AppState>,
    Json(request): Json<CreateWeightRecordRequest>,
) -> Result<(StatusCode, Json<WeightRecord>), ApiError> {
    request.validate()?;

    HedgehogRepository::new(state.pool.clone())
        .find_by_id(request.hedgehog_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Hedgehog not found".to_string()))?;

    let repo = WeightRecordRepository::new(state.pool.clone());
    let record = repo
        .create(
            request.hedgehog_id,
            request.weight,
            request.date.unwrap_or_else(|| state.clock.now()),
            &request.notes,
        )
        .await?;

    state.rechecks.submit(SweepScope::Weight);

    info!(
        record_id = record.id,
        hedgehog_id = record.hedgehog_id,
        weight = record.weight,
        "Weight recorded"
    );
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// PUT /api/weight-records/:id
pub async fn update_weight_record(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateWeightRecordRequest>,
) -> Result<Json<WeightRecord>, ApiError> {
    request.validate()?;

    let repo = WeightRecordRepository::new(state.pool.clone());
    let record = repo
        .update(
            id,
            WeightRecordChanges {
                weight: request.weight,
                date: request.date,
                notes: request.notes.as_deref(),
            },
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Weight record not found".to_string()))?;

    Ok(Json(record.into()))
}

/// DELETE /api/weight-records/:id
pub async fn delete_weight_record(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let repo = WeightRecordRepository::new(state.pool.clone());
    if !repo.soft_delete(id).await? {
        return Err(ApiError::NotFound("Weight record not found".to_string()));
    }

    info!(record_id = id, "Weight record deleted");
    Ok(StatusCode::NO_CONTENT)
}
