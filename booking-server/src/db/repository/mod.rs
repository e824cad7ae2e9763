//! Repository Module
//!
//! CRUD operations over embedded SurrealDB tables.

pub mod booking;
pub mod room;
pub mod user;

// Re-exports
pub use booking::BookingRepository;
pub use room::RoomRepository;
pub use user::UserRepository;

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use thiserror::Error;

use crate::utils::AppError;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::not_found(msg),
            RepoError::Duplicate(msg) => AppError::conflict(msg),
            RepoError::Database(msg) => AppError::database(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// ID Convention: "table:id" strings across the whole stack
// =============================================================================
//
// surrealdb::RecordId handles all IDs:
//   - parse:      let id: RecordId = "room:abc".parse()?;
//   - construct:  let id = RecordId::from_table_key("room", "abc");
//   - table name: id.table()
//   - CRUD:       db.select(id) / db.delete(id) take RecordId directly

/// Parse a caller-supplied id into a RecordId of the expected table.
///
/// Accepts both "table:id" and the bare key.
pub fn parse_id(table: &str, id: &str) -> RepoResult<RecordId> {
    let rid: RecordId = if id.contains(':') {
        id.parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?
    } else {
        RecordId::from_table_key(table, id)
    };
    if rid.table() != table {
        return Err(RepoError::Validation(format!(
            "Invalid {} ID: {}",
            table, id
        )));
    }
    Ok(rid)
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
