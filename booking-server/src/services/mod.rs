//! Long-lived services
//!
//! - [`http`] - router assembly and HTTP server lifecycle

pub mod http;

pub use self::http::{HttpService, build_app};
