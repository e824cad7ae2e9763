//! Booking Model
//!
//! Reservations are half-open intervals `[start_time, end_time)` in Unix
//! millis, so back-to-back bookings on the same room never overlap.

use super::serde_helpers;
use super::{Role, RoomId, RoomKind, UserId};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Booking ID type
pub type BookingId = RecordId;

/// Booking entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<BookingId>,
    /// Room reference
    #[serde(with = "serde_helpers::record_id")]
    pub room: RoomId,
    /// Owning user, immutable after creation
    #[serde(with = "serde_helpers::record_id")]
    pub user: UserId,
    pub start_time: i64,
    pub end_time: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Denormalized room projection attached to booking listings
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    #[serde(with = "serde_helpers::record_id")]
    pub id: RoomId,
    pub name: String,
    pub capacity: i64,
    #[serde(rename = "type")]
    pub kind: RoomKind,
}

/// Denormalized owner projection attached to booking listings
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerSummary {
    #[serde(with = "serde_helpers::record_id")]
    pub id: UserId,
    pub username: String,
    pub role: Role,
}

/// Read-side view: a booking enriched with its room and owner.
///
/// The projections are `Option` because a referenced record may vanish
/// between the listing query and the enrichment lookups.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingView {
    #[serde(with = "serde_helpers::option_record_id")]
    pub id: Option<BookingId>,
    pub room: Option<RoomSummary>,
    pub user: Option<OwnerSummary>,
    pub start_time: i64,
    pub end_time: i64,
    pub created_at: i64,
    pub updated_at: i64,
}
