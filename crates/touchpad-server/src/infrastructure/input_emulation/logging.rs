//! Backend that logs input instead of injecting it.
//!
//! Used when the binary is built without `native-input`, when the native
//! backend cannot start (no display server, missing permissions), and with
//! `--dry-run`.  It keeps a virtual cursor and the set of held buttons so the
//! API behaves the same as with a real backend: `position` reflects earlier
//! moves and releasing an unheld button is an error.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::info;
use touchpad_core::{ActuatorError, KeyboardActuator, MouseButton, PointerActuator};

#[derive(Debug, Default)]
struct VirtualPointer {
    cursor: (f64, f64),
    held: HashSet<MouseButton>,
}

#[derive(Debug, Default)]
pub struct LoggingActuator {
    pointer: Mutex<VirtualPointer>,
}

impl LoggingActuator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VirtualPointer> {
        self.pointer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PointerActuator for LoggingActuator {
    fn move_by(&self, dx: f64, dy: f64) -> Result<(), ActuatorError> {
        let mut p = self.lock();
        p.cursor = ((p.cursor.0 + dx).max(0.0), (p.cursor.1 + dy).max(0.0));
        info!(dx, dy, x = p.cursor.0, y = p.cursor.1, "pointer move");
        Ok(())
    }

    fn set_position(&self, x: f64, y: f64) -> Result<(), ActuatorError> {
        self.lock().cursor = (x, y);
        info!(x, y, "pointer set position");
        Ok(())
    }

    fn position(&self) -> Result<(f64, f64), ActuatorError> {
        Ok(self.lock().cursor)
    }

    fn press(&self, button: MouseButton) -> Result<(), ActuatorError> {
        self.lock().held.insert(button);
        info!(%button, "button press");
        Ok(())
    }

    fn release(&self, button: MouseButton) -> Result<(), ActuatorError> {
        if !self.lock().held.remove(&button) {
            return Err(ActuatorError::ButtonNotPressed(button));
        }
        info!(%button, "button release");
        Ok(())
    }

    fn click(&self, button: MouseButton) -> Result<(), ActuatorError> {
        info!(%button, "button click");
        Ok(())
    }

    fn scroll(&self, dx: f64, dy: f64) -> Result<(), ActuatorError> {
        info!(dx, dy, "scroll");
        Ok(())
    }

    fn display_size(&self) -> Result<(u32, u32), ActuatorError> {
        Err(ActuatorError::Unsupported("display_size"))
    }
}

impl KeyboardActuator for LoggingActuator {
    fn press_key(&self, key: &str) -> Result<(), ActuatorError> {
        info!(key, "key down");
        Ok(())
    }

    fn release_key(&self, key: &str) -> Result<(), ActuatorError> {
        info!(key, "key up");
        Ok(())
    }

    fn type_text(&self, text: &str) -> Result<(), ActuatorError> {
        info!(chars = text.chars().count(), "type text");
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_moves_accumulate_and_clamp_at_origin() {
        // Arrange
        let act = LoggingActuator::new();

        // Act
        act.move_by(10.0, 5.0).unwrap();
        act.move_by(-25.0, 2.5).unwrap();

        // Assert
        assert_eq!(act.position().unwrap(), (0.0, 7.5));
    }

    #[test]
    fn test_release_requires_prior_press() {
        let act = LoggingActuator::new();

        assert_eq!(
            act.release(MouseButton::Left),
            Err(ActuatorError::ButtonNotPressed(MouseButton::Left))
        );
        act.press(MouseButton::Left).unwrap();
        assert_eq!(act.release(MouseButton::Left), Ok(()));
    }

    #[test]
    fn test_display_size_is_unsupported() {
        let act = LoggingActuator::new();
        assert!(matches!(act.display_size(), Err(ActuatorError::Unsupported(_))));
    }
}
