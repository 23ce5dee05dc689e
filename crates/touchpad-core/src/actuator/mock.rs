//! Recording actuator for unit and integration testing.
//!
//! # Why a recording actuator?
//!
//! Real backends move the cursor and press keys on the machine running the
//! tests, and their effects cannot be observed from Rust code.  The
//! `RecordingActuator` replaces every OS call with an in-memory record so
//! assertions can inspect exactly what was emitted and in what order.
//!
//! It behaves like a strict backend in one respect: releasing a button that
//! is not held returns [`ActuatorError::ButtonNotPressed`].
//!
//! # Usage in tests
//!
//! ```ignore
//! let actuator = Arc::new(RecordingActuator::new());
//! let engine = TouchpadEngine::new(config, actuator.clone(), scheduler);
//! // ... drive the engine ...
//! assert_eq!(actuator.click_count(MouseButton::Left), 1);
//! ```
//!
//! # Failure injection
//!
//! Call [`RecordingActuator::set_should_fail`] to make every subsequent call
//! return [`ActuatorError::Platform`] without recording anything.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::{ActuatorError, KeyboardActuator, MouseButton, PointerActuator};

/// One recorded actuator call.
#[derive(Debug, Clone, PartialEq)]
pub enum ActuatorCall {
    MoveBy(f64, f64),
    SetPosition(f64, f64),
    Press(MouseButton),
    Release(MouseButton),
    Click(MouseButton),
    Scroll(f64, f64),
    KeyDown(String),
    KeyUp(String),
    Text(String),
}

#[derive(Debug, Default)]
struct Recorded {
    calls: Vec<ActuatorCall>,
    held: HashSet<MouseButton>,
    cursor: (f64, f64),
}

/// Pointer and keyboard actuator that records calls instead of performing them.
#[derive(Debug, Default)]
pub struct RecordingActuator {
    recorded: Mutex<Recorded>,
    should_fail: AtomicBool,
}

impl RecordingActuator {
    pub fn new() -> Self {
        Self::default()
    }

    /// When `true`, every call fails with `ActuatorError::Platform`.
    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of every recorded call, oldest first.
    pub fn calls(&self) -> Vec<ActuatorCall> {
        self.lock().calls.clone()
    }

    /// Number of clicks recorded for `button`.
    pub fn click_count(&self, button: MouseButton) -> usize {
        self.count(|c| *c == ActuatorCall::Click(button))
    }

    /// Number of recorded calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&ActuatorCall) -> bool) -> usize {
        self.lock().calls.iter().filter(|c| pred(c)).count()
    }

    /// Recorded press/release calls only, in order.
    pub fn button_transitions(&self) -> Vec<ActuatorCall> {
        self.lock()
            .calls
            .iter()
            .filter(|c| matches!(c, ActuatorCall::Press(_) | ActuatorCall::Release(_)))
            .cloned()
            .collect()
    }

    /// Whether `button` is currently held.
    pub fn is_held(&self, button: MouseButton) -> bool {
        self.lock().held.contains(&button)
    }

    /// Forgets all recorded calls; held buttons and cursor are kept.
    pub fn clear(&self) {
        self.lock().calls.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.recorded
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn check(&self) -> Result<(), ActuatorError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(ActuatorError::Platform("mock failure".into()));
        }
        Ok(())
    }
}

impl PointerActuator for RecordingActuator {
    fn move_by(&self, dx: f64, dy: f64) -> Result<(), ActuatorError> {
        self.check()?;
        let mut rec = self.lock();
        rec.cursor = (rec.cursor.0 + dx, rec.cursor.1 + dy);
        rec.calls.push(ActuatorCall::MoveBy(dx, dy));
        Ok(())
    }

    fn set_position(&self, x: f64, y: f64) -> Result<(), ActuatorError> {
        self.check()?;
        let mut rec = self.lock();
        rec.cursor = (x, y);
        rec.calls.push(ActuatorCall::SetPosition(x, y));
        Ok(())
    }

    fn position(&self) -> Result<(f64, f64), ActuatorError> {
        self.check()?;
        Ok(self.lock().cursor)
    }

    fn press(&self, button: MouseButton) -> Result<(), ActuatorError> {
        self.check()?;
        let mut rec = self.lock();
        rec.held.insert(button);
        rec.calls.push(ActuatorCall::Press(button));
        Ok(())
    }

    fn release(&self, button: MouseButton) -> Result<(), ActuatorError> {
        self.check()?;
        let mut rec = self.lock();
        if !rec.held.remove(&button) {
            return Err(ActuatorError::ButtonNotPressed(button));
        }
        rec.calls.push(ActuatorCall::Release(button));
        Ok(())
    }

    fn click(&self, button: MouseButton) -> Result<(), ActuatorError> {
        self.check()?;
        self.lock().calls.push(ActuatorCall::Click(button));
        Ok(())
    }

    fn scroll(&self, dx: f64, dy: f64) -> Result<(), ActuatorError> {
        self.check()?;
        self.lock().calls.push(ActuatorCall::Scroll(dx, dy));
        Ok(())
    }

    fn display_size(&self) -> Result<(u32, u32), ActuatorError> {
        self.check()?;
        Ok((1920, 1080))
    }
}

impl KeyboardActuator for RecordingActuator {
    fn press_key(&self, key: &str) -> Result<(), ActuatorError> {
        self.check()?;
        self.lock().calls.push(ActuatorCall::KeyDown(key.to_string()));
        Ok(())
    }

    fn release_key(&self, key: &str) -> Result<(), ActuatorError> {
        self.check()?;
        self.lock().calls.push(ActuatorCall::KeyUp(key.to_string()));
        Ok(())
    }

    fn type_text(&self, text: &str) -> Result<(), ActuatorError> {
        self.check()?;
        self.lock().calls.push(ActuatorCall::Text(text.to_string()));
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
