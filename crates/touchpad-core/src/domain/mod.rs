//! Domain types for the touchpad engine.
//!
//! Everything here is plain data plus pure functions: no locks, no timers, no
//! calls into the operating system.  The engine layer combines these pieces
//! with the injected actuator and scheduler.
//!
//! - **`gesture`** – The wire schema of one touch sample and the
//!   finger-count → [`TouchMode`](gesture::TouchMode) classifier.
//! - **`session`** – [`TouchSession`](session::TouchSession), the tracked
//!   state of one finger group between its start and end events.
//! - **`config`**  – [`TouchpadConfig`](config::TouchpadConfig), the delays,
//!   threshold and sensitivities that tune gesture recognition.

pub mod config;
pub mod gesture;
pub mod session;
