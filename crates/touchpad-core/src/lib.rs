//! # touchpad-core
//!
//! Touch-gesture interpretation engine for the remote touchpad service.
//!
//! A phone browser streams raw multi-touch samples (`touch_start`,
//! `touch_move`, `touch_end`) to the host.  This crate turns those samples
//! into pointer moves, clicks, scrolls and drags on the host computer.
//!
//! # How does a phone become a trackpad? (for beginners)
//!
//! Every touch sample carries a finger count.  The count decides what the
//! gesture *means*:
//!
//! | Fingers | Mode       | Effect on the host                             |
//! |---------|------------|------------------------------------------------|
//! | 1       | `single`   | move the cursor; a short tap becomes a click   |
//! | 2       | `scroll`   | scroll the wheel; a short tap is a right click |
//! | 3+      | `dragging` | hold the left button while moving the cursor   |
//!
//! The tricky part is timing.  A one-finger tap must not click immediately,
//! because the finger may be about to move.  Instead a *delayed click* is
//! scheduled and cancelled if the finger travels too far, or if a two-finger
//! tap arrives and claims the gesture as a right click.
//!
//! # Modules
//!
//! - **`domain`**    – Pure data: the touch event schema, the gesture
//!   classifier, per-finger-group sessions and the tuning constants.
//! - **`actuator`**  – Traits for the OS pointer/keyboard, plus a recording
//!   double used by tests.
//! - **`scheduler`** – The timer capability used for delayed clicks, plus a
//!   deterministic manual clock for tests.
//! - **`engine`**    – [`TouchpadEngine`], which owns all gesture state behind
//!   one lock and drives the [`ClickArbiter`](engine::ClickArbiter) and
//!   [`DragController`](engine::DragController).
//!
//! This crate has no dependency on sockets, HTTP or OS input APIs; those are
//! injected through the traits in `actuator` and `scheduler`.

pub mod actuator;
pub mod domain;
pub mod engine;
pub mod scheduler;

// Re-export the most-used types at the crate root so callers can write
// `touchpad_core::TouchpadEngine` instead of the full module path.
pub use actuator::{ActuatorError, KeyboardActuator, MouseButton, PointerActuator};
pub use domain::config::TouchpadConfig;
pub use domain::gesture::{classify, TouchEvent, TouchMode, TouchPoint};
pub use domain::session::TouchSession;
pub use engine::{
    ClickAction, EndOutcome, EngineStatus, MoveOutcome, StartOutcome, TouchpadEngine,
    TouchpadError,
};
pub use scheduler::{Scheduler, TimerCallback, TimerHandle};
