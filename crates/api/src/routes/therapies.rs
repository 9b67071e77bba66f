//! Therapy endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{
    CreateTherapyRequest, ListTherapiesQuery, Therapy, TherapyWithHedgehog, UpdateTherapyRequest,
};
use persistence::repositories::{HedgehogRepository, NewTherapy, TherapyChanges, TherapyRepository};
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::SweepScope;

/// GET /api/therapies
pub async fn list_therapies(
    State(state): State<AppState>,
    Query(query): Query<ListTherapiesQuery>,
) -> Result<Json<Vec<TherapyWithHedgehog>>, ApiError> {
    let repo = TherapyRepository::new(state.pool.clone());
    let therapies = repo.list(query.hedgehog_id).await?;
    Ok(Json(therapies.into_iter().map(Into::into).collect()))
}

/// POST /api/therapies
///
/// Queues a therapy recheck once the therapy is stored.
pub async fn create_therapy(
    State(state): State<AppState>,
    Json(request): Json<CreateTherapyRequest>,
) -> Result<(StatusCode, Json<Therapy>), ApiError> {
    request.validate()?;

    let now = state.clock.now();
    if !request.has_consistent_dates(now) {
        return Err(ApiError::Validation(
            "end_date: End date must not precede the start date".to_string(),
        ));
    }

    HedgehogRepository::new(state.pool.clone())
        .find_by_id(request.hedgehog_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Hedgehog not found".to_string()))?;

    let repo = TherapyRepository::new(state.pool.clone());
    let therapy = repo
        .create(NewTherapy {
            hedgehog_id: request.hedgehog_id,
            name: &request.name,
            description: &request.description,
            start_date: request.start_date.unwrap_or(now),
            end_date: request.end_date,
            status: request.status.as_str(),
        })
        .await?;

    state.rechecks.submit(SweepScope::Therapy);

    info!(
        therapy_id = therapy.id,
        hedgehog_id = therapy.hedgehog_id,
        "Therapy created"
    );
    Ok((StatusCode::CREATED, Json(therapy.into())))
}

/// PUT /api/therapies/:id
///
/// Queues a therapy recheck once the change is stored.
pub async fn update_therapy(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateTherapyRequest>,
) -> Result<Json<Therapy>, ApiError> {
    request.validate()?;

    let repo = TherapyRepository::new(state.pool.clone());
    let therapy = repo
        .update(
            id,
            TherapyChanges {
                name: request.name.as_deref(),
                description: request.description.as_deref(),
                start_date: request.start_date,
                end_date: request.end_date,
                status: request.status.as_ref().map(|s| s.as_str()),
            },
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Therapy not found".to_string()))?;

    state.rechecks.submit(SweepScope::Therapy);

    info!(therapy_id = id, "Therapy updated");
    Ok(Json(therapy.into()))
}

/// DELETE /api/therapies/:id
pub async fn delete_therapy(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let repo = TherapyRepository::new(state.pool.clone());
    if !repo.soft_delete(id).await? {
        return Err(ApiError::NotFound("Therapy not found".to_string()));
    }

    info!(therapy_id = id, "Therapy deleted");
    Ok(StatusCode::NO_CONTENT)
}
