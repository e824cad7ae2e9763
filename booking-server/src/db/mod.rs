//! Database Module
//!
//! Embedded SurrealDB: RocksDB-backed at runtime, in-memory for tests.

pub mod models;
pub mod repository;

use std::path::Path;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

use crate::utils::AppError;

const NAMESPACE: &str = "booking";
const DATABASE: &str = "booking";

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the RocksDB-backed database at `path`
    pub async fn open(path: &Path) -> Result<Self, AppError> {
        let db: Surreal<Db> = Surreal::new::<RocksDb>(path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;
        Self::prepare(db).await
    }

    /// Open a fresh in-memory database (tests, ephemeral runs)
    pub async fn memory() -> Result<Self, AppError> {
        let db: Surreal<Db> = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::database(format!("Failed to open in-memory database: {e}")))?;
        Self::prepare(db).await
    }

    async fn prepare(db: Surreal<Db>) -> Result<Self, AppError> {
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        define_schema(&db)
            .await
            .map_err(|e| AppError::database(format!("Failed to define schema: {e}")))?;

        tracing::info!("Database ready");
        Ok(Self { db })
    }
}

/// Idempotent schema setup, re-run on every startup
async fn define_schema(db: &Surreal<Db>) -> Result<(), surrealdb::Error> {
    db.query(
        r#"
        DEFINE TABLE IF NOT EXISTS user SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS user_username ON user FIELDS username UNIQUE;

        DEFINE TABLE IF NOT EXISTS room SCHEMALESS;

        DEFINE TABLE IF NOT EXISTS booking SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS booking_room ON booking FIELDS room;
        DEFINE INDEX IF NOT EXISTS booking_user ON booking FIELDS user;
        "#,
    )
    .await?;
    Ok(())
}
