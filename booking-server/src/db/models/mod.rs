//! Database Models

// Serde helpers
pub mod serde_helpers;

// Auth
pub mod user;

// Inventory
pub mod room;

// Reservations
pub mod booking;

// Re-exports
pub use booking::{Booking, BookingId, BookingView, OwnerSummary, RoomSummary};
pub use room::{Room, RoomCreate, RoomId, RoomKind, RoomUpdate};
pub use user::{Role, User, UserId};
