//! User Administration Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::models::User;
use crate::db::repository::UserRepository;
use crate::utils::{AppError, AppResult};

/// GET /api/users - list all users (admin)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<User>>> {
    let repo = UserRepository::new(state.get_db());
    let users = repo.find_all().await?;
    Ok(Json(users))
}

/// DELETE /api/users/{id} - delete a user and everything it owns (admin)
///
/// Bookings owned by the user are removed first so no booking is left
/// referencing a nonexistent owner.
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = UserRepository::new(state.get_db());
    let user = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {} not found", id)))?;

    let user_id = user
        .id
        .clone()
        .ok_or_else(|| AppError::internal("User record has no id"))?;

    let removed = state.scheduler.cancel_all_for_user(&user_id).await?;
    repo.delete(&id).await?;

    tracing::info!(
        user_id = %user_id,
        username = %user.username,
        cascade_deleted = removed,
        "User deleted"
    );

    Ok(Json(true))
}
