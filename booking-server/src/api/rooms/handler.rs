//! Room API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::api::ValidJson;
use crate::core::ServerState;
use crate::db::models::{Room, RoomCreate, RoomUpdate};
use crate::db::repository::RoomRepository;
use crate::utils::validation::{MAX_NAME_LEN, validate_optional_text, validate_required_text};
use crate::utils::{AppError, AppResult};

fn validate_capacity(capacity: i64) -> AppResult<()> {
    if capacity < 1 {
        return Err(AppError::validation("capacity must be at least 1"));
    }
    Ok(())
}

/// GET /api/rooms - list all rooms (public)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Room>>> {
    let repo = RoomRepository::new(state.get_db());
    let rooms = repo.find_all().await?;
    Ok(Json(rooms))
}

/// GET /api/rooms/{id} - fetch a single room
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Room>> {
    let repo = RoomRepository::new(state.get_db());
    let room = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Room {} not found", id)))?;
    Ok(Json(room))
}

/// POST /api/rooms - create a room (admin)
pub async fn create(
    State(state): State<ServerState>,
    ValidJson(payload): ValidJson<RoomCreate>,
) -> AppResult<(StatusCode, Json<Room>)> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_capacity(payload.capacity)?;

    let repo = RoomRepository::new(state.get_db());
    let room = repo.create(payload).await?;

    Ok((StatusCode::CREATED, Json(room)))
}

/// PUT /api/rooms/{id} - update a room (admin)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    ValidJson(payload): ValidJson<RoomUpdate>,
) -> AppResult<Json<Room>> {
    validate_optional_text(&payload.name, "name", MAX_NAME_LEN)?;
    if let Some(capacity) = payload.capacity {
        validate_capacity(capacity)?;
    }

    let repo = RoomRepository::new(state.get_db());
    let room = repo.update(&id, payload).await?;

    Ok(Json(room))
}

/// DELETE /api/rooms/{id} - delete a room (admin)
///
/// Refused while bookings still reference the room.
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Room>> {
    let repo = RoomRepository::new(state.get_db());
    let room = repo.delete(&id).await?;

    Ok(Json(room))
}
