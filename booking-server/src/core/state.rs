//! Server state

use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::booking::BookingScheduler;
use crate::core::Config;
use crate::db::DbService;
use crate::db::models::Role;
use crate::db::repository::UserRepository;
use crate::events::EventBus;
use crate::utils::AppError;

/// Server state - shared handle to every service
///
/// Cheap to clone: services are behind `Arc`s or are handles themselves.
/// All collaborators are constructed here and injected, never reached
/// through globals.
///
/// | Field | Type | Meaning |
/// |------|------|------|
/// | config | Config | immutable configuration |
/// | db | Surreal<Db> | embedded database |
/// | jwt_service | Arc<JwtService> | token issuance/validation |
/// | events | EventBus | fan-out notification bus |
/// | scheduler | BookingScheduler | reservation arbitration |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: Surreal<Db>,
    pub jwt_service: Arc<JwtService>,
    pub events: EventBus,
    pub scheduler: BookingScheduler,
}

impl ServerState {
    /// Initialize the full service graph.
    ///
    /// Order: work dir, database, JWT, event bus, scheduler, admin seed.
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        let db_dir = config.database_dir();
        std::fs::create_dir_all(&db_dir)
            .map_err(|e| AppError::internal(format!("Failed to create work directory: {e}")))?;

        let db_service = DbService::open(&db_dir.join("booking.db")).await?;
        Self::with_db(config, db_service.db).await
    }

    /// Initialize against an already-open database (tests use the
    /// in-memory engine here)
    pub async fn with_db(config: &Config, db: Surreal<Db>) -> Result<Self, AppError> {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let events = EventBus::new(config.event_queue_capacity);
        let scheduler = BookingScheduler::new(db.clone(), events.clone());

        let state = Self {
            config: config.clone(),
            db,
            jwt_service,
            events,
            scheduler,
        };

        state.ensure_admin().await?;

        Ok(state)
    }

    /// Start background tasks.
    ///
    /// Must be called before the server accepts requests.
    pub fn start_background_tasks(&self) {
        self.events.start_publisher();
    }

    /// Seed the admin account if it does not exist yet
    async fn ensure_admin(&self) -> Result<(), AppError> {
        let repo = UserRepository::new(self.db.clone());
        if repo
            .find_by_username(&self.config.admin_username)
            .await?
            .is_none()
        {
            repo.create(
                self.config.admin_username.clone(),
                &self.config.admin_password,
                Role::Admin,
            )
            .await?;
            tracing::info!(username = %self.config.admin_username, "Seeded admin account");
        }
        Ok(())
    }

    /// Database handle
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    /// JWT service handle
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
