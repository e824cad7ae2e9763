//! Scheduler error types

use thiserror::Error;

use crate::db::models::Booking;
use crate::db::repository::RepoError;
use crate::utils::AppError;

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("End time must be after start time")]
    InvalidInterval,

    #[error("Room {0} not found")]
    RoomNotFound(String),

    #[error("Booking {0} not found")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    /// Carries the colliding booking so clients can suggest another slot
    #[error("Room is not available for the selected time period")]
    Conflict(Box<Booking>),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<RepoError> for BookingError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => BookingError::NotFound(msg),
            RepoError::Validation(msg) => BookingError::Validation(msg),
            RepoError::Duplicate(msg) | RepoError::Database(msg) => BookingError::Database(msg),
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::InvalidInterval => AppError::validation(err.to_string()),
            BookingError::RoomNotFound(_) => AppError::not_found(err.to_string()),
            BookingError::NotFound(_) => AppError::not_found(err.to_string()),
            BookingError::Forbidden(msg) => AppError::forbidden(msg),
            BookingError::Conflict(existing) => {
                let message = "Room is not available for the selected time period".to_string();
                match serde_json::to_value(&*existing) {
                    Ok(value) => AppError::conflict_with(
                        message,
                        serde_json::json!({ "conflictingBooking": value }),
                    ),
                    Err(_) => AppError::conflict(message),
                }
            }
            BookingError::Validation(msg) => AppError::validation(msg),
            BookingError::Database(msg) => AppError::database(msg),
        }
    }
}
