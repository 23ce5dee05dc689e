//! `/api/touchpad`: raw touch samples in, gesture outcomes out.
//!
//! | Action        | Engine call                | Extra response fields      |
//! |---------------|----------------------------|----------------------------|
//! | `touch_start` | `on_touch_start`           | `mode`                     |
//! | `touch_move`  | `on_touch_move`            | `mode`, `dx`, `dy`         |
//! | `touch_end`   | `on_touch_end`             | `action` (when a click)    |
//! | `status`      | `status`                   | `touchpad_status`          |

use std::time::UNIX_EPOCH;

use serde::Serialize;
use touchpad_core::{EngineStatus, TouchEvent, TouchpadEngine};

use crate::application::dispatch::DispatchError;
use crate::domain::messages::{ApiRequest, ApiResponse};

/// Wire form of [`EngineStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TouchpadStatus {
    pub active_touches_count: usize,
    pub is_dragging: bool,
    pub has_pending_click: bool,
    /// Seconds since the Unix epoch of the last end event; `0` if none.
    pub last_touch_time: f64,
}

impl From<EngineStatus> for TouchpadStatus {
    fn from(status: EngineStatus) -> Self {
        let last_touch_time = status
            .last_touch_time
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map_or(0.0, |d| d.as_secs_f64());
        Self {
            active_touches_count: status.active_count,
            is_dragging: status.dragging,
            has_pending_click: status.has_pending_click,
            last_touch_time,
        }
    }
}

pub fn handle(engine: &TouchpadEngine, request: &ApiRequest) -> Result<ApiResponse, DispatchError> {
    match request.action.as_str() {
        "touch_start" => {
            let event: TouchEvent = request.params()?;
            let out = engine.on_touch_start(&event)?;
            Ok(ApiResponse::success().with("mode", out.mode))
        }
        "touch_move" => {
            let event: TouchEvent = request.params()?;
            let out = engine.on_touch_move(&event)?;
            Ok(ApiResponse::success()
                .with("mode", out.mode)
                .with("dx", out.dx)
                .with("dy", out.dy))
        }
        "touch_end" => {
            let event: TouchEvent = request.params()?;
            let out = engine.on_touch_end(&event)?;
            let mut response = ApiResponse::success().message("touch ended");
            if let Some(action) = out.action {
                response = response.with("action", action);
            }
            Ok(response)
        }
        "status" => {
            let status = TouchpadStatus::from(engine.status());
            Ok(ApiResponse::success().with("touchpad_status", status))
        }
        other => Err(DispatchError::UnsupportedAction(other.to_string())),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
