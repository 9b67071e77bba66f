//! Room and area endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{
    Area, CreateAreaRequest, CreateRoomRequest, ListAreasQuery, Room, RoomWithAreas,
    UpdateAreaRequest, UpdateRoomRequest,
};
use persistence::repositories::{AreaChanges, NewArea, RoomChanges, RoomRepository};
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;

/// GET /api/rooms
pub async fn list_rooms(State(state): State<AppState>) -> Result<Json<Vec<Room>>, ApiError> {
    let repo = RoomRepository::new(state.pool.clone());
    let rooms = repo.list_rooms().await?;
    Ok(Json(rooms.into_iter().map(Into::into).collect()))
}

/// GET /api/rooms/:id
pub async fn get_room(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RoomWithAreas>, ApiError> {
    let repo = RoomRepository::new(state.pool.clone());
    let room = repo
        .find_room(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Room not found".to_string()))?;
    let areas = repo.list_areas(Some(id)).await?;

    Ok(Json(RoomWithAreas {
        room: room.into(),
        areas: areas.into_iter().map(Into::into).collect(),
    }))
}

/// POST /api/rooms
pub async fn create_room(
    State(state): State<AppState>,
    Json(request): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<Room>), ApiError> {
    request.validate()?;

    let repo = RoomRepository::new(state.pool.clone());
    let room = repo
        .create_room(
            &request.name,
            &request.description,
            request.width,
            request.height,
        )
        .await?;

    info!(room_id = room.id, name = %room.name, "Room created");
    Ok((StatusCode::CREATED, Json(room.into())))
}

/// PUT /api/rooms/:id
pub async fn update_room(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateRoomRequest>,
) -> Result<Json<Room>, ApiError> {
    request.validate()?;

    let repo = RoomRepository::new(state.pool.clone());
    let room = repo
        .update_room(
            id,
            RoomChanges {
                name: request.name.as_deref(),
                description: request.description.as_deref(),
                width: request.width,
                height: request.height,
            },
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Room not found".to_string()))?;

    Ok(Json(room.into()))
}

/// DELETE /api/rooms/:id
pub async fn delete_room(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let repo = RoomRepository::new(state.pool.clone());
    if !repo.delete_room(id).await? {
        return Err(ApiError::NotFound("Room not found".to_string()));
    }

    info!(room_id = id, "Room deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/areas
pub async fn list_areas(
    State(state): State<AppState>,
    Query(query): Query<ListAreasQuery>,
) -> Result<Json<Vec<Area>>, ApiError> {
    let repo = RoomRepository::new(state.pool.clone());
    let areas = repo.list_areas(query.room_id).await?;
    Ok(Json(areas.into_iter().map(Into::into).collect()))
}

/// POST /api/areas
pub async fn create_area(
    State(state): State<AppState>,
    Json(request): Json<CreateAreaRequest>,
) -> Result<(StatusCode, Json<Area>), ApiError> {
    request.validate()?;

    let repo = RoomRepository::new(state.pool.clone());
    repo.find_room(request.room_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Room not found".to_string()))?;

    let area = repo
        .create_area(NewArea {
            name: &request.name,
            room_id: request.room_id,
            x: request.x,
            y: request.y,
            width: request.width,
            height: request.height,
            max_capacity: request.max_capacity,
        })
        .await?;

    info!(area_id = area.id, room_id = area.room_id, "Area created");
    Ok((StatusCode::CREATED, Json(area.into())))
}

/// PUT /api/areas/:id
pub async fn update_area(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateAreaRequest>,
) -> Result<Json<Area>, ApiError> {
    request.validate()?;

    let repo = RoomRepository::new(state.pool.clone());
    let area = repo
        .update_area(
            id,
            AreaChanges {
                name: request.name.as_deref(),
                room_id: request.room_id,
                x: request.x,
                y: request.y,
                width: request.width,
                height: request.height,
                max_capacity: request.max_capacity,
            },
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Area not found".to_string()))?;

    Ok(Json(area.into()))
}

/// DELETE /api/areas/:id
pub async fn delete_area(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let repo = RoomRepository::new(state.pool.clone());
    if !repo.delete_area(id).await? {
        return Err(ApiError::NotFound("Area not found".to_string()));
    }

    info!(area_id = id, "Area deleted");
    Ok(StatusCode::NO_CONTENT)
}
