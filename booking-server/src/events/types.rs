//! Booking lifecycle event payloads
//!
//! Each event serializes to a flat JSON record tagged by its `event` name,
//! matching what subscribed clients receive over the WebSocket:
//!
//! ```json
//! {"event":"bookingCreated","bookingId":"booking:x","roomId":"room:y",
//!  "userId":"user:z","startTime":1754000000000,"endTime":1754003600000}
//! ```

use serde::Serialize;

use crate::db::models::Booking;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum BookingEvent {
    #[serde(rename = "bookingCreated", rename_all = "camelCase")]
    Created {
        booking_id: String,
        room_id: String,
        user_id: String,
        start_time: i64,
        end_time: i64,
    },

    #[serde(rename = "bookingUpdated", rename_all = "camelCase")]
    Updated {
        booking_id: String,
        room_id: String,
        user_id: String,
        start_time: i64,
        end_time: i64,
    },

    /// Interval omitted: the reservation no longer exists
    #[serde(rename = "bookingCancelled", rename_all = "camelCase")]
    Cancelled {
        booking_id: String,
        room_id: String,
        user_id: String,
    },
}

impl BookingEvent {
    fn ids(booking: &Booking) -> (String, String, String) {
        (
            booking.id.as_ref().map(|t| t.to_string()).unwrap_or_default(),
            booking.room.to_string(),
            booking.user.to_string(),
        )
    }

    pub fn created(booking: &Booking) -> Self {
        let (booking_id, room_id, user_id) = Self::ids(booking);
        Self::Created {
            booking_id,
            room_id,
            user_id,
            start_time: booking.start_time,
            end_time: booking.end_time,
        }
    }

    pub fn updated(booking: &Booking) -> Self {
        let (booking_id, room_id, user_id) = Self::ids(booking);
        Self::Updated {
            booking_id,
            room_id,
            user_id,
            start_time: booking.start_time,
            end_time: booking.end_time,
        }
    }

    pub fn cancelled(booking: &Booking) -> Self {
        let (booking_id, room_id, user_id) = Self::ids(booking);
        Self::Cancelled {
            booking_id,
            room_id,
            user_id,
        }
    }
}
