//! Booking API Handlers
//!
//! Thin HTTP adapters over the scheduler: parse and convert input here
//! (RFC 3339 timestamps to Unix millis, string ids to record ids), let
//! the scheduler arbitrate.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::api::ValidJson;
use crate::auth::CurrentUser;
use crate::booking::{BookingPatch, BookingRequest};
use crate::core::ServerState;
use crate::db::models::{Booking, BookingView};
use crate::db::repository::parse_id;
use crate::utils::AppResult;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingCreate {
    pub room: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingUpdate {
    pub room: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

/// POST /api/bookings - reserve a slot
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    ValidJson(payload): ValidJson<BookingCreate>,
) -> AppResult<(StatusCode, Json<Booking>)> {
    let request = BookingRequest {
        room: parse_id("room", &payload.room)?,
        start_time: payload.start_time.timestamp_millis(),
        end_time: payload.end_time.timestamp_millis(),
    };

    let booking = state.scheduler.create(request, &user).await?;

    Ok((StatusCode::CREATED, Json(booking)))
}

/// GET /api/bookings - list visible bookings with room/owner projections
pub async fn list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<BookingView>>> {
    let bookings = state.scheduler.list(&user).await?;
    Ok(Json(bookings))
}

/// PUT /api/bookings/{id} - move or reshape a reservation
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    ValidJson(payload): ValidJson<BookingUpdate>,
) -> AppResult<Json<Booking>> {
    let patch = BookingPatch {
        room: payload
            .room
            .as_deref()
            .map(|r| parse_id("room", r))
            .transpose()?,
        start_time: payload.start_time.map(|t| t.timestamp_millis()),
        end_time: payload.end_time.map(|t| t.timestamp_millis()),
    };

    let booking = state.scheduler.update(&id, patch, &user).await?;

    Ok(Json(booking))
}

/// DELETE /api/bookings/{id} - cancel a reservation
pub async fn cancel(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<Booking>> {
    let booking = state.scheduler.cancel(&id, &user).await?;

    Ok(Json(booking))
}
