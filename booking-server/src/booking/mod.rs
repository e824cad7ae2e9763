//! Booking Scheduler
//!
//! Arbitrates time-slot reservations per room: every mutating operation
//! funnels through the same half-open-interval overlap check, evaluated
//! under the target room's lock so the scan and the write observe a
//! consistent snapshot.

pub mod error;
pub mod locks;


use std::collections::HashMap;
use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::CurrentUser;
use crate::db::models::{Booking, BookingView, OwnerSummary, RoomId, RoomSummary};
use crate::db::repository::{BookingRepository, RoomRepository, UserRepository, parse_id};
use crate::events::{BookingEvent, EventBus};

pub use error::BookingError;
pub use locks::RoomLocks;

/// A validated reservation request: room plus half-open interval in
/// Unix millis
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub room: RoomId,
    pub start_time: i64,
    pub end_time: i64,
}

/// Partial update; omitted fields keep the booking's current values
#[derive(Debug, Clone, Default)]
pub struct BookingPatch {
    pub room: Option<RoomId>,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
}

/// The scheduler; cheap to clone, shared via [`crate::core::ServerState`]
#[derive(Clone)]
pub struct BookingScheduler {
    db: Surreal<Db>,
    events: EventBus,
    locks: Arc<RoomLocks>,
}

impl BookingScheduler {
    pub fn new(db: Surreal<Db>, events: EventBus) -> Self {
        Self {
            db,
            events,
            locks: Arc::new(RoomLocks::new()),
        }
    }

    fn bookings(&self) -> BookingRepository {
        BookingRepository::new(self.db.clone())
    }

    fn rooms(&self) -> RoomRepository {
        RoomRepository::new(self.db.clone())
    }

    fn users(&self) -> UserRepository {
        UserRepository::new(self.db.clone())
    }

    /// Reserve an interval on a room for the caller.
    ///
    /// The conflict scan and the insert run under the room's lock;
    /// of any set of concurrent overlapping requests at most one commits.
    pub async fn create(
        &self,
        req: BookingRequest,
        caller: &CurrentUser,
    ) -> Result<Booking, BookingError> {
        if req.start_time >= req.end_time {
            return Err(BookingError::InvalidInterval);
        }

        let room = self
            .rooms()
            .find_by_record_id(&req.room)
            .await?
            .ok_or_else(|| BookingError::RoomNotFound(req.room.to_string()))?;
        let room_id = room.id.unwrap_or(req.room);

        let user: surrealdb::RecordId = parse_id("user", &caller.id)?;

        let _guard = self.locks.acquire(&room_id).await;

        if let Some(existing) = self
            .bookings()
            .find_overlapping(&room_id, req.start_time, req.end_time, None)
            .await?
        {
            return Err(BookingError::Conflict(Box::new(existing)));
        }

        let booking = self
            .bookings()
            .create(room_id, user, req.start_time, req.end_time)
            .await?;

        tracing::info!(
            booking_id = %booking.id.as_ref().map(|t| t.to_string()).unwrap_or_default(),
            room = %booking.room,
            user = %booking.user,
            "Booking created"
        );
        self.events.publish(BookingEvent::created(&booking));

        Ok(booking)
    }

    /// List bookings visible to the caller, enriched with room and owner
    /// projections. Regular users see their own bookings, admins see all.
    pub async fn list(&self, caller: &CurrentUser) -> Result<Vec<BookingView>, BookingError> {
        let bookings = if caller.is_admin() {
            self.bookings().find_all().await?
        } else {
            let user: surrealdb::RecordId = parse_id("user", &caller.id)?;
            self.bookings().find_by_user(&user).await?
        };

        let rooms = self.rooms();
        let users = self.users();
        let mut room_cache: HashMap<String, Option<RoomSummary>> = HashMap::new();
        let mut owner_cache: HashMap<String, Option<OwnerSummary>> = HashMap::new();

        let mut views = Vec::with_capacity(bookings.len());
        for booking in bookings {
            let room_key = booking.room.to_string();
            if !room_cache.contains_key(&room_key) {
                let summary = rooms.find_by_record_id(&booking.room).await?.and_then(|r| {
                    r.id.map(|id| RoomSummary {
                        id,
                        name: r.name,
                        capacity: r.capacity,
                        kind: r.kind,
                    })
                });
                room_cache.insert(room_key.clone(), summary);
            }

            let owner_key = booking.user.to_string();
            if !owner_cache.contains_key(&owner_key) {
                let summary = users.find_by_id(&owner_key).await?.and_then(|u| {
                    u.id.map(|id| OwnerSummary {
                        id,
                        username: u.username,
                        role: u.role,
                    })
                });
                owner_cache.insert(owner_key.clone(), summary);
            }

            views.push(BookingView {
                id: booking.id,
                room: room_cache.get(&room_key).cloned().flatten(),
                user: owner_cache.get(&owner_key).cloned().flatten(),
                start_time: booking.start_time,
                end_time: booking.end_time,
                created_at: booking.created_at,
                updated_at: booking.updated_at,
            });
        }

        Ok(views)
    }

    /// Move or reshape an existing booking.
    ///
    /// The effective room and interval are the patch merged over the
    /// current record; the scan runs against that merge with the booking
    /// itself excluded, under the effective room's lock.
    pub async fn update(
        &self,
        id: &str,
        patch: BookingPatch,
        caller: &CurrentUser,
    ) -> Result<Booking, BookingError> {
        let current = self
            .bookings()
            .find_by_id(id)
            .await?
            .ok_or_else(|| BookingError::NotFound(id.to_string()))?;

        self.authorize(&current, caller)?;

        let booking_id = current
            .id
            .clone()
            .ok_or_else(|| BookingError::Database("Booking record has no id".into()))?;

        // Merge patch over current before any validation or scanning;
        // checking only the supplied fields would let a partial patch
        // slip past the overlap check
        let room_changed = patch
            .room
            .as_ref()
            .is_some_and(|room| *room != current.room);
        let effective_room = patch.room.unwrap_or_else(|| current.room.clone());
        let start = patch.start_time.unwrap_or(current.start_time);
        let end = patch.end_time.unwrap_or(current.end_time);

        if start >= end {
            return Err(BookingError::InvalidInterval);
        }

        if room_changed {
            self.rooms()
                .find_by_record_id(&effective_room)
                .await?
                .ok_or_else(|| BookingError::RoomNotFound(effective_room.to_string()))?;
        }

        let _guard = self.locks.acquire(&effective_room).await;

        if let Some(existing) = self
            .bookings()
            .find_overlapping(&effective_room, start, end, Some(&booking_id))
            .await?
        {
            return Err(BookingError::Conflict(Box::new(existing)));
        }

        let updated = self
            .bookings()
            .update_interval(&booking_id, effective_room, start, end)
            .await?;

        tracing::info!(booking_id = %booking_id, "Booking updated");
        self.events.publish(BookingEvent::updated(&updated));

        Ok(updated)
    }

    /// Release a reservation (hard delete), returning the removed record
    pub async fn cancel(
        &self,
        id: &str,
        caller: &CurrentUser,
    ) -> Result<Booking, BookingError> {
        let current = self
            .bookings()
            .find_by_id(id)
            .await?
            .ok_or_else(|| BookingError::NotFound(id.to_string()))?;

        self.authorize(&current, caller)?;

        let booking_id = current
            .id
            .clone()
            .ok_or_else(|| BookingError::Database("Booking record has no id".into()))?;

        let deleted = self
            .bookings()
            .delete(&booking_id)
            .await?
            .unwrap_or(current);

        tracing::info!(booking_id = %booking_id, "Booking cancelled");
        self.events.publish(BookingEvent::cancelled(&deleted));

        Ok(deleted)
    }

    /// Remove every booking owned by `user` (user-deletion cascade).
    ///
    /// Emits no events, matching the administrative nature of the
    /// operation.
    pub async fn cancel_all_for_user(
        &self,
        user: &surrealdb::RecordId,
    ) -> Result<usize, BookingError> {
        let deleted = self.bookings().delete_by_user(user).await?;
        if !deleted.is_empty() {
            tracing::info!(user = %user, count = deleted.len(), "Cascade-deleted bookings");
        }
        Ok(deleted.len())
    }

    /// Ownership rule: only the owner or an admin may mutate a booking
    fn authorize(&self, booking: &Booking, caller: &CurrentUser) -> Result<(), BookingError> {
        if caller.is_admin() || booking.user.to_string() == caller.id {
            Ok(())
        } else {
            Err(BookingError::Forbidden(
                "You can only modify your own bookings".to_string(),
            ))
        }
    }
}
