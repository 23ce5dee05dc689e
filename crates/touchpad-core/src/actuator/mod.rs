//! OS pointer and keyboard control, as seen by the engine.
//!
//! The engine never talks to the operating system directly.  It calls a
//! [`PointerActuator`] that the application injects at construction:
//!
//! - In production, an OS backend (see the server crate's
//!   `infrastructure::input_emulation`).
//! - In tests, [`mock::RecordingActuator`] or a `mockall` mock, which record
//!   the calls so assertions can check exactly what was emitted.
//!
//! All methods take `&self` and must be cheap and non-blocking: the engine
//! calls them while holding its state lock.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod mock;

/// Mouse buttons the actuator can press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

impl MouseButton {
    /// Every button, in a fixed order.
    pub const ALL: [MouseButton; 3] = [MouseButton::Left, MouseButton::Right, MouseButton::Middle];

    pub fn as_str(self) -> &'static str {
        match self {
            MouseButton::Left => "left",
            MouseButton::Right => "right",
            MouseButton::Middle => "middle",
        }
    }
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MouseButton {
    type Err = ActuatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(MouseButton::Left),
            "right" => Ok(MouseButton::Right),
            "middle" => Ok(MouseButton::Middle),
            _ => Err(ActuatorError::UnknownButton(s.to_string())),
        }
    }
}

/// Failure reported by an actuator backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActuatorError {
    #[error("platform error: {0}")]
    Platform(String),

    /// Release of a button that is not held.  Callers that release
    /// defensively treat this as success.
    #[error("{0} button is not pressed")]
    ButtonNotPressed(MouseButton),

    #[error("unknown mouse button: {0}")]
    UnknownButton(String),

    #[error("operation not supported by this backend: {0}")]
    Unsupported(&'static str),
}

/// Platform-agnostic pointer control.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait PointerActuator: Send + Sync {
    /// Moves the cursor by a relative offset in host pixels.
    fn move_by(&self, dx: f64, dy: f64) -> Result<(), ActuatorError>;

    /// Moves the cursor to an absolute host position.
    fn set_position(&self, x: f64, y: f64) -> Result<(), ActuatorError>;

    /// Current cursor position in host pixels.
    fn position(&self) -> Result<(f64, f64), ActuatorError>;

    /// Presses and holds `button`.
    fn press(&self, button: MouseButton) -> Result<(), ActuatorError>;

    /// Releases a held `button`.
    ///
    /// Backends that track button state return
    /// [`ActuatorError::ButtonNotPressed`] for a button that is not held.
    fn release(&self, button: MouseButton) -> Result<(), ActuatorError>;

    /// Presses and releases `button` once.
    fn click(&self, button: MouseButton) -> Result<(), ActuatorError>;

    /// Scrolls the wheel.  Positive `dy` scrolls up, positive `dx` right.
    fn scroll(&self, dx: f64, dy: f64) -> Result<(), ActuatorError>;

    /// Size of the primary display in host pixels.
    fn display_size(&self) -> Result<(u32, u32), ActuatorError>;
}

/// Platform-agnostic keyboard control.
///
/// Keys are symbolic names (`"ctrl"`, `"enter"`, `"a"`); translating them to
/// platform key codes is the backend's job.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait KeyboardActuator: Send + Sync {
    fn press_key(&self, key: &str) -> Result<(), ActuatorError>;

    fn release_key(&self, key: &str) -> Result<(), ActuatorError>;

    /// Types `text` as a sequence of key strokes.
    fn type_text(&self, text: &str) -> Result<(), ActuatorError>;
}

// ── Tests ─────────────────────────────────────────────────────────────────────
