//! API routing module
//!
//! # Structure
//!
//! - [`health`] - liveness probe
//! - [`auth`] - registration, login, current principal
//! - [`rooms`] - room inventory (admin-gated mutation)
//! - [`bookings`] - reservation operations
//! - [`users`] - user administration
//! - [`events`] - WebSocket event stream

pub mod auth;
pub mod bookings;
pub mod events;
pub mod health;
pub mod rooms;
pub mod users;

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use crate::utils::{AppError, AppResult};

/// JSON extractor whose rejection is the application's 400 validation
/// error instead of axum's default, so malformed and missing fields
/// surface uniformly.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> AppResult<Self> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;
        Ok(ValidJson(value))
    }
}
