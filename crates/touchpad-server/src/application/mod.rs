//! Application layer for touchpad-server.
//!
//! Knows *what* each API action does and delegates *how* to injected traits:
//! [`touchpad_core::PointerActuator`], [`touchpad_core::KeyboardActuator`]
//! and [`system::SystemControl`].  Nothing here opens sockets or spawns
//! processes, so every route is testable with recording doubles.
//!
//! - `dispatch` – [`ApiService`], the single entry point that decodes a body,
//!   routes it and turns errors into HTTP responses.
//! - `touchpad`, `mouse`, `keyboard`, `system` – one module per API route.

pub mod dispatch;
pub mod keyboard;
pub mod mouse;
pub mod system;
pub mod touchpad;

pub use dispatch::{ApiService, DispatchError, Route};
pub use system::{HostDetails, SystemControl, SystemError};
