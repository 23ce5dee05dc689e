//! Press/hold/release lifecycle of the three-finger drag.
//!
//! ```text
//!   begin / track (engage)          track                 finish
//! Idle ──────────────────> Held ─────────────> Held ──────────────> Idle
//!        press(left)              move_by only        release(left)
//! ```
//!
//! Exactly one press when the drag engages and exactly one release when it
//! ends; moves in between never touch the button.  The drag belongs to the
//! touch id that engaged it, and only that id's end event releases it.

use tracing::{debug, warn};

use crate::actuator::{ActuatorError, MouseButton, PointerActuator};

#[derive(Debug, Clone, PartialEq)]
struct HeldDrag {
    owner: String,
    anchor: (f64, f64),
}

/// Tracks whether the drag button is held, by which touch, and where the
/// drag last was.
#[derive(Debug, Default)]
pub struct DragController {
    held: Option<HeldDrag>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.held.is_some()
    }

    /// Touch id that engaged the current drag.
    pub fn owner(&self) -> Option<&str> {
        self.held.as_ref().map(|h| h.owner.as_str())
    }

    pub fn is_owned_by(&self, touch_id: &str) -> bool {
        self.owner() == Some(touch_id)
    }

    /// Last known drag position; `None` when not dragging.
    pub fn anchor(&self) -> Option<(f64, f64)> {
        self.held.as_ref().map(|h| h.anchor)
    }

    /// Starts a drag owned by `owner` at `(x, y)` and presses the left
    /// button.  No-op while a drag is already held.
    ///
    /// The drag is recorded even when the press fails, so the owner's end
    /// event still runs [`finish`](Self::finish).
    ///
    /// # Errors
    ///
    /// Returns the actuator's error if the press fails.
    pub fn begin(
        &mut self,
        pointer: &dyn PointerActuator,
        owner: &str,
        x: f64,
        y: f64,
    ) -> Result<(), ActuatorError> {
        if let Some(held) = &self.held {
            debug!(owner, held_by = %held.owner, "drag already held; not pressing again");
            return Ok(());
        }
        self.held = Some(HeldDrag {
            owner: owner.to_string(),
            anchor: (x, y),
        });
        debug!(owner, x, y, "drag started; pressing left button");
        pointer.press(MouseButton::Left)
    }

    /// Moves the held drag by `(dx, dy)` scaled by `sensitivity`.
    ///
    /// A drag that is not yet engaged (the finger count grew mid-gesture)
    /// is engaged first, owned by `touch_id`.
    ///
    /// # Errors
    ///
    /// Returns the actuator's error if the press or move fails.
    pub fn track(
        &mut self,
        pointer: &dyn PointerActuator,
        touch_id: &str,
        (x, y): (f64, f64),
        (dx, dy): (f64, f64),
        sensitivity: f64,
    ) -> Result<(), ActuatorError> {
        if let Some(held) = self.held.as_mut() {
            held.anchor = (x, y);
        } else {
            self.begin(pointer, touch_id, x, y)?;
        }
        pointer.move_by(dx * sensitivity, dy * sensitivity)
    }

    /// Ends the drag and releases the left button.
    ///
    /// Returns `Ok(false)` when no drag was active.  A backend report that
    /// the button was already released is logged and treated as success.
    ///
    /// # Errors
    ///
    /// Returns any other actuator error; the drag is cleared regardless.
    pub fn finish(&mut self, pointer: &dyn PointerActuator) -> Result<bool, ActuatorError> {
        if self.held.take().is_none() {
            return Ok(false);
        }

        match pointer.release(MouseButton::Left) {
            Ok(()) => {
                debug!("drag finished; left button released");
                Ok(true)
            }
            Err(ActuatorError::ButtonNotPressed(button)) => {
                warn!("drag release: {button} button was already released");
                Ok(true)
            }
            Err(e) => Err(e),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
