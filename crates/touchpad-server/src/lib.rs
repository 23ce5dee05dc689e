//! touchpad-server library crate.
//!
//! Exposes the touchpad engine and direct mouse, keyboard and system
//! controls over a small JSON HTTP API, and serves the phone UI.
//!
//! # Architecture
//!
//! ```text
//! Phone browser (JSON over HTTP)
//!         ↕
//! [touchpad-server]
//!   ├── domain/           ServerConfig, request/response JSON types
//!   ├── application/      Route handlers over injected traits
//!   └── infrastructure/
//!         ├── http_server/     tiny_http worker loop, CORS, static files
//!         ├── scheduler/       Tokio-backed delayed-click timers
//!         ├── input_emulation/ logging and native (enigo) backends
//!         ├── system/          lock/power commands, host info, LAN probe
//!         └── config_store/    config file discovery and loading
//!         ↕
//! touchpad-core (gesture engine)
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O.
//! - `application` depends on `domain` and `touchpad-core` only; every OS
//!   effect goes through a trait.
//! - `infrastructure` implements those traits and owns sockets, threads and
//!   processes.

pub mod application;
pub mod domain;
pub mod infrastructure;
