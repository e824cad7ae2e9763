//! Booking Server - coworking space reservation backend
//!
//! # Architecture overview
//!
//! The server authenticates users, manages room inventory and arbitrates
//! time-slot reservations, broadcasting changes to connected clients:
//!
//! - **Scheduler** (`booking`): conflict resolution over half-open
//!   intervals, atomic per room
//! - **Database** (`db`): embedded SurrealDB storage
//! - **Auth** (`auth`): JWT + Argon2
//! - **Events** (`events`): bounded-queue fan-out to WebSocket clients
//! - **HTTP API** (`api`): RESTful surface
//!
//! # Module structure
//!
//! ```text
//! booking-server/src/
//! ├── core/          # configuration, state, lifecycle
//! ├── auth/          # JWT authentication, role checks
//! ├── services/      # HTTP service
//! ├── api/           # HTTP routes and handlers
//! ├── booking/       # reservation scheduler
//! ├── events/        # event bus
//! ├── db/            # database layer
//! └── utils/         # errors, logging, validation
//! ```

pub mod api;
pub mod auth;
pub mod booking;
pub mod core;
pub mod db;
pub mod events;
pub mod services;
pub mod utils;

// Re-export public types
pub use auth::{CurrentUser, JwtService};
pub use booking::{BookingPatch, BookingRequest, BookingScheduler};
pub use crate::core::{Config, Server, ServerState};
pub use events::{BookingEvent, EventBus};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - tracing with a dedicated target
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}
