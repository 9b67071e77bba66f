//! Hedgehog endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{CreateHedgehogRequest, Hedgehog, ListHedgehogsQuery, UpdateHedgehogRequest};
use persistence::repositories::{HedgehogChanges, HedgehogRepository, NewHedgehog};
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::SweepScope;

/// GET /api/hedgehogs
pub async fn list_hedgehogs(
    State(state): State<AppState>,
    Query(query): Query<ListHedgehogsQuery>,
) -> Result<Json<Vec<Hedgehog>>, ApiError> {
    let repo = HedgehogRepository::new(state.pool.clone());
    let hedgehogs = repo.list(query.status.as_ref().map(|s| s.as_str())).await?;
    Ok(Json(hedgehogs.into_iter().map(Into::into).collect()))
}

/// GET /api/hedgehogs/:id
pub async fn get_hedgehog(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Hedgehog>, ApiError> {
    let repo = HedgehogRepository::new(state.pool.clone());
    let hedgehog = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Hedgehog not found".to_string()))?;
    Ok(Json(hedgehog.into()))
}

/// POST /api/hedgehogs
pub async fn create_hedgehog(
    State(state): State<AppState>,
    Json(request): Json<CreateHedgehogRequest>,
) -> Result<(StatusCode, Json<Hedgehog>), ApiError> {
    request.validate()?;

    let repo = HedgehogRepository::new(state.pool.clone());
    let entity = repo
        .create(NewHedgehog {
            name: &request.name,
            description: &request.description,
            arrival_date: request.arrival_date.unwrap_or_else(|| state.clock.now()),
            status: request.status.as_str(),
            release_date: request.release_date,
            area_id: request.area_id,
        })
        .await?;

    info!(hedgehog_id = entity.id, name = %entity.name, "Hedgehog registered");
    Ok((StatusCode::CREATED, Json(entity.into())))
}

/// PUT /api/hedgehogs/:id
///
/// Queues a missing-weighing recheck once the change is stored.
pub async fn update_hedgehog(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateHedgehogRequest>,
) -> Result<Json<Hedgehog>, ApiError> {
    request.validate()?;

    let repo = HedgehogRepository::new(state.pool.clone());
    let entity = repo
        .update(
            id,
            HedgehogChanges {
                name: request.name.as_deref(),
                description: request.description.as_deref(),
                arrival_date: request.arrival_date,
                status: request.status.as_ref().map(|s| s.as_str()),
                release_date: request.release_date,
                area_id: request.area_id,
            },
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Hedgehog not found".to_string()))?;

    state.rechecks.submit(SweepScope::MissingWeighing);

    info!(hedgehog_id = id, "Hedgehog updated");
    Ok(Json(entity.into()))
}

/// DELETE /api/hedgehogs/:id
pub async fn delete_hedgehog(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let repo = HedgehogRepository::new(state.pool.clone());
    if !repo.soft_delete(id).await? {
        return Err(ApiError::NotFound("Hedgehog not found".to_string()));
    }

    info!(hedgehog_id = id, "Hedgehog deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::HedgehogStatus;

    #[test]
    fn test_list_query_parses_status() {
        let query: ListHedgehogsQuery = serde_json::from_str(r#"{"status":"released"}"#).unwrap();
        assert_eq!(query.status, Some(HedgehogStatus::Released));
    }

    #[test]
    fn test_create_request_defaults() {
        let request: CreateHedgehogRequest = serde_json::from_str(r#"{"name":"Spike"}"#).unwrap();
        assert_eq!(request.status, HedgehogStatus::InCare);
        assert!(request.arrival_date.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_request_rejects_empty_name() {
        let request: CreateHedgehogRequest = serde_json::from_str(r#"{"name":""}"#).unwrap();
        assert!(request.validate().is_err());
    }
}
