//! Per-finger-group tracking state.

use std::time::{Duration, Instant};

use super::gesture::TouchPoint;

/// Tracked state of one touch id between its start and end events.
///
/// The anchor (`start_x`, `start_y`) never moves; threshold decisions use the
/// straight-line distance from it, not the per-event deltas.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchSession {
    pub start_x: f64,
    pub start_y: f64,
    pub current_x: f64,
    pub current_y: f64,
    pub start_time: Instant,
}

impl TouchSession {
    /// Opens a session anchored at `point`.
    pub fn begin(point: TouchPoint, now: Instant) -> Self {
        Self {
            start_x: point.x,
            start_y: point.y,
            current_x: point.x,
            current_y: point.y,
            start_time: now,
        }
    }

    /// Moves the current position to `point` and returns the `(dx, dy)` step
    /// from the previous position.
    pub fn advance(&mut self, point: TouchPoint) -> (f64, f64) {
        let dx = point.x - self.current_x;
        let dy = point.y - self.current_y;
        self.current_x = point.x;
        self.current_y = point.y;
        (dx, dy)
    }

    /// Distance from the anchor to the current position.
    pub fn total_distance(&self) -> f64 {
        (self.current_x - self.start_x).hypot(self.current_y - self.start_y)
    }

    /// Time elapsed since the session opened.
    pub fn duration(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.start_time)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
