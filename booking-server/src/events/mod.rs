//! Real-time event fan-out
//!
//! - [`BookingEvent`] - lifecycle event payloads
//! - [`EventBus`] - bounded-queue bus feeding connected subscribers

pub mod bus;
pub mod types;

pub use bus::EventBus;
pub use types::BookingEvent;
