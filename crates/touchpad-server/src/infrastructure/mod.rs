//! Infrastructure layer for touchpad-server.
//!
//! Everything that touches the outside world lives here: the HTTP listener,
//! timers on the Tokio runtime, OS input injection, platform commands and the
//! config file.
//!
//! # What does NOT belong here?
//!
//! - Gesture interpretation (that is `touchpad-core`)
//! - Route semantics and status mapping (that is the application layer)
//! - JSON and config schema types (that is the domain layer)

pub mod config_store;
pub mod http_server;
pub mod input_emulation;
pub mod scheduler;
pub mod system;

pub use http_server::HttpServer;
pub use input_emulation::{create_backend, InputBackend};
pub use scheduler::TokioScheduler;
pub use system::{lan_address, CommandRunner, HostSystem, ProcessRunner};
