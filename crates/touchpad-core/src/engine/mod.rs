//! TouchpadEngine: turns touch samples into pointer actions.
//!
//! The engine is the orchestrator.  For every sample it:
//!
//! 1. Validates the event and looks up (or opens) the [`TouchSession`].
//! 2. Recomputes the [`TouchMode`] from the sample's finger count.
//! 3. Drives the [`ClickArbiter`] and [`DragController`], which call the
//!    injected [`PointerActuator`].
//!
//! # Locking model
//!
//! All mutable state (sessions, pending click, drag) sits behind one
//! `Mutex`.  Request handlers and the delayed-click timer callback both take
//! that lock for the whole of a state transition, so transitions never
//! interleave.  Actuator calls happen inside the lock; they are expected to be
//! fast and non-blocking and are never retried.
//!
//! The timer callback holds only a `Weak` reference to the engine, so a
//! dropped engine never clicks.
//!
//! # Per-mode behaviour
//!
//! | Event | `single`                          | `scroll`                         | `dragging`           |
//! |-------|-----------------------------------|----------------------------------|----------------------|
//! | start | schedule delayed left click       | cancel pending click             | cancel, press left   |
//! | move  | cancel if past threshold; move    | cancel; scroll (y inverted)      | move with button held|
//! | end   | report `left_click`               | quick still tap → right click    | release left         |
//!
//! The drag belongs to the touch id that engaged it.  Only that id's end
//! event releases the button, in any mode; [`TouchpadEngine::shutdown`]
//! releases it unconditionally.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::SystemTime;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::actuator::{ActuatorError, MouseButton, PointerActuator};
use crate::domain::config::TouchpadConfig;
use crate::domain::gesture::{TouchEvent, TouchMode};
use crate::domain::session::TouchSession;
use crate::scheduler::{Scheduler, TimerCallback};

mod arbiter;
mod drag;

pub use arbiter::ClickArbiter;
pub use drag::DragController;

// ── Error and outcome types ───────────────────────────────────────────────────

/// Errors returned by engine operations.
///
/// `InvalidEvent` and `UnknownTouch` are validation failures and never change
/// engine state.  `Actuator` is reported after the engine's own bookkeeping
/// has been brought up to date.
#[derive(Debug, Error)]
pub enum TouchpadError {
    #[error("invalid touch event: {0}")]
    InvalidEvent(String),

    #[error("unknown touch id: {0}")]
    UnknownTouch(String),

    #[error("actuator failure: {0}")]
    Actuator(#[from] ActuatorError),
}

impl TouchpadError {
    /// Whether the error came from validating the caller's event.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            TouchpadError::InvalidEvent(_) | TouchpadError::UnknownTouch(_)
        )
    }
}

/// Click reported by a completed gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickAction {
    /// A one-finger gesture ended.  The click itself is delivered by the
    /// delayed-click timer unless something cancelled it.
    LeftClick,
    /// A two-finger tap was turned into an immediate right click.
    RightClick,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StartOutcome {
    pub mode: TouchMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MoveOutcome {
    pub mode: TouchMode,
    pub dx: f64,
    pub dy: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EndOutcome {
    pub mode: TouchMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<ClickAction>,
}

/// Snapshot returned by [`TouchpadEngine::status`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineStatus {
    pub active_count: usize,
    pub dragging: bool,
    pub has_pending_click: bool,
    /// Wall-clock time of the most recent end event.
    pub last_touch_time: Option<SystemTime>,
}

// ── Engine ────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct EngineState {
    sessions: HashMap<String, TouchSession>,
    last_touch_time: Option<SystemTime>,
    arbiter: ClickArbiter,
    drag: DragController,
}

struct EngineInner {
    config: TouchpadConfig,
    pointer: Arc<dyn PointerActuator>,
    scheduler: Arc<dyn Scheduler>,
    state: Mutex<EngineState>,
}

/// The touch-gesture interpretation engine.
///
/// Cloning is cheap and yields another handle to the same engine.
#[derive(Clone)]
pub struct TouchpadEngine {
    inner: Arc<EngineInner>,
}

impl TouchpadEngine {
    /// Creates an engine driving `pointer` with timers from `scheduler`.
    pub fn new(
        config: TouchpadConfig,
        pointer: Arc<dyn PointerActuator>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                config,
                pointer,
                scheduler,
                state: Mutex::new(EngineState::default()),
            }),
        }
    }

    pub fn config(&self) -> &TouchpadConfig {
        &self.inner.config
    }

    /// Handles a finger-group touching down.
    ///
    /// # Errors
    ///
    /// - [`TouchpadError::InvalidEvent`] if the event has no touch positions.
    /// - [`TouchpadError::Actuator`] if the drag press fails; the session
    ///   and drag are recorded anyway.
    pub fn on_touch_start(&self, event: &TouchEvent) -> Result<StartOutcome, TouchpadError> {
        let point = event
            .primary_point()
            .ok_or_else(|| TouchpadError::InvalidEvent("touch list is empty".into()))?;
        let mode = event.mode();
        let inner = &*self.inner;

        let mut guard = inner.lock_state();
        let state = &mut *guard;
        state.sessions.insert(
            event.touch_id.clone(),
            TouchSession::begin(point, inner.scheduler.now()),
        );
        debug!(
            touch_id = %event.touch_id,
            %mode,
            x = point.x,
            y = point.y,
            "touch start"
        );

        match mode {
            TouchMode::Single => {
                let engine = Arc::downgrade(&self.inner);
                state.arbiter.schedule(
                    inner.scheduler.as_ref(),
                    inner.config.click_delay,
                    |token| delayed_click(engine, token),
                );
            }
            TouchMode::Scroll => {
                state.arbiter.cancel(inner.scheduler.as_ref());
            }
            TouchMode::Dragging => {
                state.arbiter.cancel(inner.scheduler.as_ref());
                state
                    .drag
                    .begin(inner.pointer.as_ref(), &event.touch_id, point.x, point.y)
                    .map_err(|e| actuator_failure("drag press", e))?;
            }
        }

        Ok(StartOutcome { mode })
    }

    /// Handles movement of an active finger-group.
    ///
    /// # Errors
    ///
    /// - [`TouchpadError::UnknownTouch`] if no session exists for the id.
    /// - [`TouchpadError::InvalidEvent`] if the event has no touch positions.
    /// - [`TouchpadError::Actuator`] if the cursor move or scroll fails; the
    ///   session position is updated anyway.
    pub fn on_touch_move(&self, event: &TouchEvent) -> Result<MoveOutcome, TouchpadError> {
        let inner = &*self.inner;
        let cfg = &inner.config;
        let pointer = inner.pointer.as_ref();
        let scheduler = inner.scheduler.as_ref();

        let mut guard = inner.lock_state();
        let state = &mut *guard;
        let session = state
            .sessions
            .get_mut(&event.touch_id)
            .ok_or_else(|| TouchpadError::UnknownTouch(event.touch_id.clone()))?;
        let point = event
            .primary_point()
            .ok_or_else(|| TouchpadError::InvalidEvent("touch list is empty".into()))?;

        let (dx, dy) = session.advance(point);
        let total_distance = session.total_distance();
        let mode = event.mode();
        debug!(
            touch_id = %event.touch_id,
            %mode,
            dx,
            dy,
            total_distance,
            "touch move"
        );

        let result = match mode {
            TouchMode::Single => {
                if total_distance > cfg.move_threshold {
                    state.arbiter.cancel(scheduler);
                }
                pointer.move_by(dx * cfg.cursor_sensitivity, dy * cfg.cursor_sensitivity)
            }
            TouchMode::Scroll => {
                state.arbiter.cancel(scheduler);
                pointer.scroll(dx * cfg.scroll_sensitivity, -dy * cfg.scroll_sensitivity)
            }
            TouchMode::Dragging => {
                if !state.drag.is_dragging() {
                    state.arbiter.cancel(scheduler);
                }
                state
                    .drag
                    .track(
                        pointer,
                        &event.touch_id,
                        (point.x, point.y),
                        (dx, dy),
                        cfg.cursor_sensitivity,
                    )
            }
        };
        result.map_err(|e| actuator_failure("touch move", e))?;

        Ok(MoveOutcome { mode, dx, dy })
    }

    /// Handles a finger-group lifting.
    ///
    /// The session is removed unconditionally.  A held drag is released when
    /// the touch that engaged it ends, whatever mode the end event classifies
    /// as; other touches ending leave it held.
    ///
    /// # Errors
    ///
    /// - [`TouchpadError::UnknownTouch`] if no session exists for the id.
    /// - [`TouchpadError::Actuator`] if the right click or drag release
    ///   fails; all bookkeeping is already cleared when this is returned.
    pub fn on_touch_end(&self, event: &TouchEvent) -> Result<EndOutcome, TouchpadError> {
        let inner = &*self.inner;
        let cfg = &inner.config;
        let pointer = inner.pointer.as_ref();
        let scheduler = inner.scheduler.as_ref();

        let mut guard = inner.lock_state();
        let state = &mut *guard;
        let session = state
            .sessions
            .remove(&event.touch_id)
            .ok_or_else(|| TouchpadError::UnknownTouch(event.touch_id.clone()))?;

        let duration = session.duration(scheduler.now());
        let total_distance = session.total_distance();
        let mode = event.mode();
        state.last_touch_time = Some(SystemTime::now());
        debug!(
            touch_id = %event.touch_id,
            %mode,
            ?duration,
            total_distance,
            "touch end"
        );

        let mut failure = None;
        let action = match mode {
            TouchMode::Scroll
                if duration < cfg.double_click_time && total_distance < cfg.move_threshold =>
            {
                // Right click wins over any pending left click, including one
                // scheduled by a different touch id.
                state.arbiter.cancel(scheduler);
                if let Err(e) = pointer.click(MouseButton::Right) {
                    failure = Some(actuator_failure("right click", e));
                }
                Some(ClickAction::RightClick)
            }
            TouchMode::Single => Some(ClickAction::LeftClick),
            TouchMode::Scroll | TouchMode::Dragging => None,
        };

        if state.drag.is_owned_by(&event.touch_id) {
            if let Err(e) = state.drag.finish(pointer) {
                let err = actuator_failure("drag release", e);
                failure.get_or_insert(err);
            }
        }

        match failure {
            Some(err) => Err(err),
            None => Ok(EndOutcome { mode, action }),
        }
    }

    /// Snapshot of the engine state.
    pub fn status(&self) -> EngineStatus {
        let state = self.inner.lock_state();
        EngineStatus {
            active_count: state.sessions.len(),
            dragging: state.drag.is_dragging(),
            has_pending_click: state.arbiter.has_pending(),
            last_touch_time: state.last_touch_time,
        }
    }

    /// Cancels any pending click, releases a held drag and forgets all
    /// sessions.  Used on process shutdown.
    pub fn shutdown(&self) {
        let inner = &*self.inner;
        let mut guard = inner.lock_state();
        let state = &mut *guard;

        state.arbiter.cancel(inner.scheduler.as_ref());
        if let Err(e) = state.drag.finish(inner.pointer.as_ref()) {
            warn!("drag release during shutdown failed: {e}");
        }
        state.sessions.clear();
        debug!("touchpad engine shut down");
    }
}

impl EngineInner {
    fn lock_state(&self) -> MutexGuard<'_, EngineState> {
        // A panic inside a transition must not wedge the touchpad.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs on the scheduler's thread when a delayed click expires.
    fn fire_delayed_click(&self, token: u64) {
        let mut state = self.lock_state();
        if !state.arbiter.claim(token) {
            return;
        }
        match self.pointer.click(MouseButton::Left) {
            Ok(()) => debug!(token, "delayed left click fired"),
            Err(e) => warn!(token, "delayed left click failed: {e}"),
        }
    }
}

impl Drop for EngineInner {
    fn drop(&mut self) {
        let state = self
            .state
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        state.arbiter.cancel(self.scheduler.as_ref());
    }
}

fn delayed_click(engine: Weak<EngineInner>, token: u64) -> TimerCallback {
    Box::new(move || {
        if let Some(inner) = engine.upgrade() {
            inner.fire_delayed_click(token);
        }
    })
}

fn actuator_failure(operation: &'static str, err: ActuatorError) -> TouchpadError {
    warn!("{operation} failed: {err}");
    TouchpadError::Actuator(err)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::mock::{ActuatorCall, RecordingActuator};
    use crate::actuator::MockPointerActuator;
    use crate::domain::gesture::TouchPoint;
    use crate::scheduler::manual::ManualScheduler;
    use std::time::Duration;

    fn make_engine() -> (TouchpadEngine, Arc<RecordingActuator>, Arc<ManualScheduler>) {
        let act = Arc::new(RecordingActuator::new());
        let sched = Arc::new(ManualScheduler::new());
        let engine = TouchpadEngine::new(
            TouchpadConfig::default(),
            Arc::clone(&act) as Arc<dyn PointerActuator>,
            Arc::clone(&sched) as Arc<dyn Scheduler>,
        );
        (engine, act, sched)
    }

    fn touch(id: &str, x: f64, y: f64, fingers: i64) -> TouchEvent {
        TouchEvent::new(id, vec![TouchPoint::new(x, y)]).with_touch_count(fingers)
    }

    fn lift(id: &str, fingers: i64) -> TouchEvent {
        TouchEvent::lifted(id).with_touch_count(fingers)
    }

    // ── Start ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_start_with_empty_touch_list_is_invalid_and_changes_nothing() {
        // Arrange
        let (engine, act, sched) = make_engine();

        // Act
        let result = engine.on_touch_start(&TouchEvent::new("t1", vec![]));

        // Assert
        assert!(matches!(result, Err(TouchpadError::InvalidEvent(_))));
        assert_eq!(engine.status().active_count, 0);
        assert_eq!(sched.pending(), 0);
        assert!(act.calls().is_empty());
    }

    #[test]
    fn test_single_start_schedules_click_without_clicking() {
        let (engine, act, _sched) = make_engine();

        let out = engine.on_touch_start(&touch("t1", 100.0, 100.0, 1)).unwrap();

        assert_eq!(out.mode, TouchMode::Single);
        assert!(engine.status().has_pending_click);
        assert!(act.calls().is_empty());
    }

    #[test]
    fn test_start_reusing_id_overwrites_session() {
        let (engine, _act, _sched) = make_engine();
        engine.on_touch_start(&touch("t1", 0.0, 0.0, 1)).unwrap();

        engine.on_touch_start(&touch("t1", 50.0, 50.0, 1)).unwrap();
        let out = engine.on_touch_move(&touch("t1", 51.0, 50.0, 1)).unwrap();

        assert_eq!(engine.status().active_count, 1);
        assert_eq!((out.dx, out.dy), (1.0, 0.0));
    }

    #[test]
    fn test_scroll_start_cancels_pending_click() {
        let (engine, _act, _sched) = make_engine();
        engine.on_touch_start(&touch("a", 0.0, 0.0, 1)).unwrap();

        let out = engine.on_touch_start(&touch("b", 0.0, 0.0, 2)).unwrap();

        assert_eq!(out.mode, TouchMode::Scroll);
        assert!(!engine.status().has_pending_click);
    }

    #[test]
    fn test_drag_start_presses_left_and_sets_dragging() {
        let (engine, act, _sched) = make_engine();

        let out = engine.on_touch_start(&touch("t1", 5.0, 5.0, 3)).unwrap();

        assert_eq!(out.mode, TouchMode::Dragging);
        assert!(engine.status().dragging);
        assert_eq!(act.calls(), vec![ActuatorCall::Press(MouseButton::Left)]);
    }

    // ── Move ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_move_unknown_touch_is_rejected() {
        let (engine, act, _sched) = make_engine();

        let result = engine.on_touch_move(&touch("ghost", 1.0, 1.0, 1));

        assert!(matches!(result, Err(TouchpadError::UnknownTouch(id)) if id == "ghost"));
        assert!(act.calls().is_empty());
    }

    #[test]
    fn test_single_move_scales_cursor_by_sensitivity() {
        let (engine, act, _sched) = make_engine();
        engine.on_touch_start(&touch("t1", 10.0, 10.0, 1)).unwrap();

        let out = engine.on_touch_move(&touch("t1", 12.0, 9.0, 1)).unwrap();

        assert_eq!((out.dx, out.dy), (2.0, -1.0));
        assert_eq!(act.calls(), vec![ActuatorCall::MoveBy(4.0, -2.0)]);
    }

    #[test]
    fn test_single_move_within_threshold_keeps_pending_click() {
        let (engine, _act, _sched) = make_engine();
        engine.on_touch_start(&touch("t1", 0.0, 0.0, 1)).unwrap();

        engine.on_touch_move(&touch("t1", 3.0, 4.0, 1)).unwrap();

        // Distance is exactly 5: not strictly greater than the threshold.
        assert!(engine.status().has_pending_click);
    }

    #[test]
    fn test_single_move_past_threshold_cancels_pending_click() {
        let (engine, _act, _sched) = make_engine();
        engine.on_touch_start(&touch("t1", 0.0, 0.0, 1)).unwrap();

        engine.on_touch_move(&touch("t1", 6.0, 0.0, 1)).unwrap();

        assert!(!engine.status().has_pending_click);
    }

    #[test]
    fn test_scroll_move_inverts_vertical_axis() {
        let (engine, act, _sched) = make_engine();
        engine.on_touch_start(&touch("t1", 0.0, 0.0, 2)).unwrap();

        engine.on_touch_move(&touch("t1", 10.0, 20.0, 2)).unwrap();

        assert_eq!(act.calls(), vec![ActuatorCall::Scroll(1.0, -2.0)]);
    }

    #[test]
    fn test_mode_is_recomputed_from_each_event() {
        // Arrange: gesture starts with one finger
        let (engine, act, _sched) = make_engine();
        engine.on_touch_start(&touch("t1", 0.0, 0.0, 1)).unwrap();

        // Act: the client now reports two fingers
        let out = engine.on_touch_move(&touch("t1", 0.0, 10.0, 2)).unwrap();

        // Assert: the move is treated as a scroll
        assert_eq!(out.mode, TouchMode::Scroll);
        assert_eq!(act.calls(), vec![ActuatorCall::Scroll(0.0, -1.0)]);
        assert!(!engine.status().has_pending_click);
    }

    #[test]
    fn test_move_promoted_to_dragging_engages_drag_once() {
        let (engine, act, _sched) = make_engine();
        engine.on_touch_start(&touch("t1", 0.0, 0.0, 1)).unwrap();

        engine.on_touch_move(&touch("t1", 1.0, 0.0, 3)).unwrap();
        engine.on_touch_move(&touch("t1", 2.0, 0.0, 3)).unwrap();

        assert_eq!(
            act.button_transitions(),
            vec![ActuatorCall::Press(MouseButton::Left)]
        );
        assert!(engine.status().dragging);
        assert!(!engine.status().has_pending_click);
    }

    #[test]
    fn test_move_actuator_failure_is_reported_but_position_updates() {
        let (engine, act, _sched) = make_engine();
        engine.on_touch_start(&touch("t1", 0.0, 0.0, 1)).unwrap();
        act.set_should_fail(true);

        let result = engine.on_touch_move(&touch("t1", 2.0, 0.0, 1));
        act.set_should_fail(false);
        let out = engine.on_touch_move(&touch("t1", 3.0, 0.0, 1)).unwrap();

        assert!(matches!(result, Err(TouchpadError::Actuator(_))));
        assert_eq!(out.dx, 1.0);
    }

    // ── End ───────────────────────────────────────────────────────────────────

    #[test]
    fn test_end_unknown_touch_is_rejected() {
        let (engine, _act, _sched) = make_engine();
        engine.on_touch_start(&touch("t1", 0.0, 0.0, 1)).unwrap();

        let result = engine.on_touch_end(&lift("other", 1));

        assert!(matches!(result, Err(TouchpadError::UnknownTouch(_))));
        assert_eq!(engine.status().active_count, 1);
    }

    #[test]
    fn test_single_end_reports_left_click_and_records_time() {
        let (engine, _act, _sched) = make_engine();
        engine.on_touch_start(&touch("t1", 0.0, 0.0, 1)).unwrap();

        let out = engine.on_touch_end(&lift("t1", 1)).unwrap();

        assert_eq!(out.action, Some(ClickAction::LeftClick));
        assert!(engine.status().last_touch_time.is_some());
    }

    #[test]
    fn test_quick_two_finger_tap_right_clicks() {
        let (engine, act, sched) = make_engine();
        engine.on_touch_start(&touch("t1", 0.0, 0.0, 2)).unwrap();
        sched.advance(Duration::from_millis(100));

        let out = engine.on_touch_end(&lift("t1", 2)).unwrap();

        assert_eq!(out.action, Some(ClickAction::RightClick));
        assert_eq!(act.click_count(MouseButton::Right), 1);
    }

    #[test]
    fn test_slow_two_finger_tap_does_not_right_click() {
        let (engine, act, sched) = make_engine();
        engine.on_touch_start(&touch("t1", 0.0, 0.0, 2)).unwrap();
        sched.advance(Duration::from_millis(300));

        let out = engine.on_touch_end(&lift("t1", 2)).unwrap();

        assert_eq!(out.action, None);
        assert_eq!(act.click_count(MouseButton::Right), 0);
    }

    #[test]
    fn test_two_finger_scroll_does_not_right_click() {
        let (engine, act, _sched) = make_engine();
        engine.on_touch_start(&touch("t1", 0.0, 0.0, 2)).unwrap();
        engine.on_touch_move(&touch("t1", 0.0, 30.0, 2)).unwrap();

        engine.on_touch_end(&lift("t1", 2)).unwrap();

        assert_eq!(act.click_count(MouseButton::Right), 0);
    }

    #[test]
    fn test_end_releases_drag_even_when_finger_count_dropped() {
        let (engine, act, _sched) = make_engine();
        engine.on_touch_start(&touch("t1", 0.0, 0.0, 3)).unwrap();

        engine.on_touch_end(&lift("t1", 0)).unwrap();

        assert!(!act.is_held(MouseButton::Left));
        assert!(!engine.status().dragging);
    }

    #[test]
    fn test_other_touch_ending_leaves_drag_held() {
        // Arrange
        let (engine, act, _sched) = make_engine();
        engine.on_touch_start(&touch("drag", 0.0, 0.0, 3)).unwrap();
        engine.on_touch_start(&touch("stray", 40.0, 40.0, 1)).unwrap();

        // Act
        engine.on_touch_end(&lift("stray", 1)).unwrap();

        // Assert
        assert!(engine.status().dragging);
        assert!(act.is_held(MouseButton::Left));
        assert_eq!(act.button_transitions(), vec![ActuatorCall::Press(MouseButton::Left)]);
    }

    #[test]
    fn test_second_drag_start_does_not_press_again() {
        let (engine, act, _sched) = make_engine();
        engine.on_touch_start(&touch("first", 0.0, 0.0, 3)).unwrap();

        engine.on_touch_start(&touch("second", 0.0, 0.0, 3)).unwrap();
        engine.on_touch_end(&lift("second", 3)).unwrap();
        let held_after_second = act.is_held(MouseButton::Left);
        engine.on_touch_end(&lift("first", 3)).unwrap();

        assert!(held_after_second);
        assert_eq!(
            act.button_transitions(),
            vec![
                ActuatorCall::Press(MouseButton::Left),
                ActuatorCall::Release(MouseButton::Left),
            ]
        );
        assert!(!engine.status().dragging);
    }

    #[test]
    fn test_drag_release_failure_still_clears_state() {
        // Arrange: press works, release fails at the platform level
        let mut mock = MockPointerActuator::new();
        mock.expect_press().times(1).returning(|_| Ok(()));
        mock.expect_release()
            .times(1)
            .returning(|_| Err(ActuatorError::Platform("xtest gone".into())));
        let sched = Arc::new(ManualScheduler::new());
        let engine = TouchpadEngine::new(TouchpadConfig::default(), Arc::new(mock), sched);
        engine.on_touch_start(&touch("t1", 0.0, 0.0, 3)).unwrap();

        // Act
        let result = engine.on_touch_end(&lift("t1", 3));

        // Assert
        assert!(matches!(result, Err(TouchpadError::Actuator(_))));
        let status = engine.status();
        assert_eq!(status.active_count, 0);
        assert!(!status.dragging);
    }

    #[test]
    fn test_right_click_failure_still_cancels_pending_left_click() {
        let mut mock = MockPointerActuator::new();
        mock.expect_click()
            .returning(|_| Err(ActuatorError::Platform("denied".into())));
        let sched = Arc::new(ManualScheduler::new());
        let engine =
            TouchpadEngine::new(TouchpadConfig::default(), Arc::new(mock), sched.clone());
        engine.on_touch_start(&touch("one", 0.0, 0.0, 1)).unwrap();
        engine.on_touch_start(&touch("two", 0.0, 0.0, 2)).unwrap();
        engine.on_touch_start(&touch("one", 0.0, 0.0, 1)).unwrap();
        engine.on_touch_end(&lift("one", 1)).unwrap();

        let result = engine.on_touch_end(&lift("two", 2));

        assert!(result.is_err());
        assert!(!engine.status().has_pending_click);
        assert_eq!(sched.pending(), 0);
    }

    // ── Delayed click ─────────────────────────────────────────────────────────

    #[test]
    fn test_delayed_click_fires_once_after_click_delay() {
        let (engine, act, sched) = make_engine();
        engine.on_touch_start(&touch("t1", 0.0, 0.0, 1)).unwrap();

        sched.advance(Duration::from_millis(149));
        assert_eq!(act.click_count(MouseButton::Left), 0);

        sched.advance(Duration::from_millis(1));
        sched.advance(Duration::from_secs(1));
        assert_eq!(act.click_count(MouseButton::Left), 1);
        assert!(!engine.status().has_pending_click);
    }

    #[test]
    fn test_dropped_engine_never_clicks() {
        let (engine, act, sched) = make_engine();
        engine.on_touch_start(&touch("t1", 0.0, 0.0, 1)).unwrap();

        drop(engine);
        sched.advance(Duration::from_secs(1));

        assert_eq!(act.click_count(MouseButton::Left), 0);
    }

    #[test]
    fn test_shutdown_cancels_click_and_releases_drag() {
        let (engine, act, sched) = make_engine();
        engine.on_touch_start(&touch("a", 0.0, 0.0, 1)).unwrap();
        engine.on_touch_start(&touch("b", 0.0, 0.0, 3)).unwrap();
        engine.on_touch_start(&touch("c", 0.0, 0.0, 1)).unwrap();

        engine.shutdown();
        sched.advance(Duration::from_secs(1));

        let status = engine.status();
        assert_eq!(status.active_count, 0);
        assert!(!status.dragging);
        assert!(!status.has_pending_click);
        assert!(!act.is_held(MouseButton::Left));
        assert_eq!(act.click_count(MouseButton::Left), 0);
    }
}
