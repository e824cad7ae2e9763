//! Room Repository

use super::{BaseRepository, RepoError, RepoResult, parse_id};
use crate::db::models::{Room, RoomCreate, RoomId, RoomUpdate};
use chrono::Utc;
use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "room";

#[derive(Debug, Deserialize)]
struct CountRow {
    count: i64,
}

#[derive(Clone)]
pub struct RoomRepository {
    base: BaseRepository,
}

impl RoomRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all rooms
    pub async fn find_all(&self) -> RepoResult<Vec<Room>> {
        let rooms: Vec<Room> = self
            .base
            .db()
            .query("SELECT * FROM room ORDER BY name")
            .await?
            .take(0)?;
        Ok(rooms)
    }

    /// Find room by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Room>> {
        let rid = parse_id(TABLE, id)?;
        let room: Option<Room> = self.base.db().select(rid).await?;
        Ok(room)
    }

    /// Find room by record id
    pub async fn find_by_record_id(&self, id: &RoomId) -> RepoResult<Option<Room>> {
        let room: Option<Room> = self.base.db().select(id.clone()).await?;
        Ok(room)
    }

    /// Create a new room
    pub async fn create(&self, data: RoomCreate) -> RepoResult<Room> {
        let now = Utc::now().timestamp_millis();
        let room = Room {
            id: None,
            name: data.name,
            capacity: data.capacity,
            kind: data.kind,
            created_at: now,
            updated_at: now,
        };

        let created: Option<Room> = self.base.db().create(TABLE).content(room).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create room".to_string()))
    }

    /// Update a room; omitted fields keep their current values
    pub async fn update(&self, id: &str, data: RoomUpdate) -> RepoResult<Room> {
        let rid = parse_id(TABLE, id)?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Room {} not found", id)))?;

        let name = data.name.unwrap_or(existing.name);
        let capacity = data.capacity.unwrap_or(existing.capacity);
        let kind = data.kind.unwrap_or(existing.kind);
        let now = Utc::now().timestamp_millis();

        self.base
            .db()
            .query("UPDATE $thing SET name = $name, capacity = $capacity, `type` = $kind, updatedAt = $now")
            .bind(("thing", rid))
            .bind(("name", name))
            .bind(("capacity", capacity))
            .bind(("kind", kind))
            .bind(("now", now))
            .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Room {} not found", id)))
    }

    /// Hard delete a room; refused while bookings still reference it
    pub async fn delete(&self, id: &str) -> RepoResult<Room> {
        let rid = parse_id(TABLE, id)?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Room {} not found", id)))?;

        let counts: Vec<CountRow> = self
            .base
            .db()
            .query("SELECT count() FROM booking WHERE room = $room GROUP ALL")
            .bind(("room", rid.clone()))
            .await?
            .take(0)?;
        if counts.first().map(|c| c.count).unwrap_or(0) > 0 {
            return Err(RepoError::Validation(
                "Cannot delete room with existing bookings".into(),
            ));
        }

        let _deleted: Option<Room> = self.base.db().delete(rid).await?;
        Ok(existing)
    }
}
