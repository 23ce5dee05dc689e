//! Domain layer for touchpad-server.
//!
//! Pure types with no I/O: the configuration schema and the JSON shapes of
//! API requests and responses.

pub mod config;
pub mod messages;

pub use config::{HttpConfig, InputConfig, ServerConfig, SystemConfig};
pub use messages::{ApiRequest, ApiResponse};
