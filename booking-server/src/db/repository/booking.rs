//! Booking Repository
//!
//! Owns the canonical interval-overlap query used by every mutating
//! scheduling operation.

use super::{BaseRepository, RepoError, RepoResult, parse_id};
use crate::db::models::{Booking, BookingId, RoomId, UserId};
use chrono::Utc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "booking";

#[derive(Clone)]
pub struct BookingRepository {
    base: BaseRepository,
}

impl BookingRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all bookings
    pub async fn find_all(&self) -> RepoResult<Vec<Booking>> {
        let bookings: Vec<Booking> = self
            .base
            .db()
            .query("SELECT * FROM booking ORDER BY startTime")
            .await?
            .take(0)?;
        Ok(bookings)
    }

    /// Find all bookings owned by a user
    pub async fn find_by_user(&self, user: &UserId) -> RepoResult<Vec<Booking>> {
        let bookings: Vec<Booking> = self
            .base
            .db()
            .query("SELECT * FROM booking WHERE user = $user ORDER BY startTime")
            .bind(("user", user.clone()))
            .await?
            .take(0)?;
        Ok(bookings)
    }

    /// Find booking by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Booking>> {
        let rid = parse_id(TABLE, id)?;
        let booking: Option<Booking> = self.base.db().select(rid).await?;
        Ok(booking)
    }

    /// Find a booking on `room` whose half-open interval overlaps
    /// `[start, end)`. Two intervals overlap iff `s1 < e2 && s2 < e1`,
    /// which lets back-to-back bookings abut without colliding.
    ///
    /// `exclude` removes one booking from the scan (a booking never
    /// conflicts with itself during update).
    pub async fn find_overlapping(
        &self,
        room: &RoomId,
        start: i64,
        end: i64,
        exclude: Option<&BookingId>,
    ) -> RepoResult<Option<Booking>> {
        let mut result = match exclude {
            Some(excluded) => {
                self.base
                    .db()
                    .query(
                        "SELECT * FROM booking \
                         WHERE room = $room AND id != $exclude \
                           AND startTime < $end AND endTime > $start \
                         LIMIT 1",
                    )
                    .bind(("room", room.clone()))
                    .bind(("exclude", excluded.clone()))
                    .bind(("start", start))
                    .bind(("end", end))
                    .await?
            }
            None => {
                self.base
                    .db()
                    .query(
                        "SELECT * FROM booking \
                         WHERE room = $room \
                           AND startTime < $end AND endTime > $start \
                         LIMIT 1",
                    )
                    .bind(("room", room.clone()))
                    .bind(("start", start))
                    .bind(("end", end))
                    .await?
            }
        };
        let bookings: Vec<Booking> = result.take(0)?;
        Ok(bookings.into_iter().next())
    }

    /// Create a new booking owned by `user`
    ///
    /// room and user are bound explicitly so they land as record links,
    /// not strings
    pub async fn create(
        &self,
        room: RoomId,
        user: UserId,
        start: i64,
        end: i64,
    ) -> RepoResult<Booking> {
        let now = Utc::now().timestamp_millis();
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE booking SET
                    room = $room,
                    user = $user,
                    startTime = $start,
                    endTime = $end,
                    createdAt = $now,
                    updatedAt = $now
                RETURN AFTER"#,
            )
            .bind(("room", room))
            .bind(("user", user))
            .bind(("start", start))
            .bind(("end", end))
            .bind(("now", now))
            .await?;

        let created: Option<Booking> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create booking".to_string()))
    }

    /// Persist the effective room and interval of an existing booking
    pub async fn update_interval(
        &self,
        id: &BookingId,
        room: RoomId,
        start: i64,
        end: i64,
    ) -> RepoResult<Booking> {
        let now = Utc::now().timestamp_millis();
        self.base
            .db()
            .query(
                "UPDATE $thing SET room = $room, startTime = $start, \
                 endTime = $end, updatedAt = $now",
            )
            .bind(("thing", id.clone()))
            .bind(("room", room))
            .bind(("start", start))
            .bind(("end", end))
            .bind(("now", now))
            .await?;

        let updated: Option<Booking> = self.base.db().select(id.clone()).await?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Booking {} not found", id)))
    }

    /// Hard delete a booking, returning the removed record
    pub async fn delete(&self, id: &BookingId) -> RepoResult<Option<Booking>> {
        let deleted: Option<Booking> = self.base.db().delete(id.clone()).await?;
        Ok(deleted)
    }

    /// Hard delete every booking owned by `user`, returning the removed
    /// records (used by the user-deletion cascade)
    pub async fn delete_by_user(&self, user: &UserId) -> RepoResult<Vec<Booking>> {
        let deleted: Vec<Booking> = self
            .base
            .db()
            .query("DELETE booking WHERE user = $user RETURN BEFORE")
            .bind(("user", user.clone()))
            .await?
            .take(0)?;
        Ok(deleted)
    }
}
