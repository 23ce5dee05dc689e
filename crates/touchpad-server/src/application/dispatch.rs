//! Request dispatch: body → route handler → [`ApiResponse`].
//!
//! [`ApiService`] owns handles to everything a route may touch.  The HTTP
//! layer calls [`ApiService::handle`] once per `POST` and writes back
//! whatever it returns; errors never escape as panics or `Err` values.
//!
//! # Status mapping
//!
//! | Error                                         | HTTP |
//! |-----------------------------------------------|------|
//! | bad JSON, unsupported action, missing field   | 400  |
//! | unknown touch id, touch event with no points  | 400  |
//! | unknown mouse button                          | 400  |
//! | power command disabled by configuration       | 403  |
//! | actuator or system command failure            | 500  |

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, warn};
use touchpad_core::{ActuatorError, KeyboardActuator, PointerActuator, TouchpadEngine, TouchpadError};

use crate::application::system::{SystemControl, SystemError};
use crate::application::{keyboard, mouse, system, touchpad};
use crate::domain::config::{InputConfig, SystemConfig};
use crate::domain::messages::{ApiRequest, ApiResponse, RequestError};

/// Any failure while serving an API request.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("unsupported action: {0}")]
    UnsupportedAction(String),

    /// A required parameter is absent or empty.
    #[error("missing parameter: {0}")]
    MissingParameter(&'static str),

    /// A parameter is present but outside its accepted range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error(transparent)]
    Touchpad(#[from] TouchpadError),

    #[error("input failed: {0}")]
    Actuator(#[from] ActuatorError),

    #[error(transparent)]
    System(#[from] SystemError),
}

impl DispatchError {
    /// HTTP status code this error is reported with.
    pub fn http_status(&self) -> u16 {
        match self {
            DispatchError::Request(_)
            | DispatchError::UnsupportedAction(_)
            | DispatchError::MissingParameter(_)
            | DispatchError::InvalidParameter(_) => 400,
            DispatchError::Touchpad(e) if e.is_validation() => 400,
            DispatchError::Touchpad(_) => 500,
            DispatchError::Actuator(ActuatorError::UnknownButton(_)) => 400,
            DispatchError::Actuator(_) => 500,
            DispatchError::System(SystemError::NotPermitted(_)) => 403,
            DispatchError::System(_) => 500,
        }
    }
}

/// The four API endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Touchpad,
    Mouse,
    Keyboard,
    System,
}

impl Route {
    /// Maps a request path (query string allowed) to a route.
    pub fn from_path(path: &str) -> Option<Route> {
        let path = path.split('?').next().unwrap_or(path);
        match path.trim_end_matches('/') {
            "/api/touchpad" => Some(Route::Touchpad),
            "/api/mouse" => Some(Route::Mouse),
            "/api/keyboard" => Some(Route::Keyboard),
            "/api/system" => Some(Route::System),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Route::Touchpad => "touchpad",
            Route::Mouse => "mouse",
            Route::Keyboard => "keyboard",
            Route::System => "system",
        })
    }
}

/// Serves decoded API requests against the engine and the injected backends.
///
/// Shared by every HTTP worker thread; all methods take `&self`.
pub struct ApiService {
    engine: TouchpadEngine,
    pointer: Arc<dyn PointerActuator>,
    keyboard: Arc<dyn KeyboardActuator>,
    system: Arc<dyn SystemControl>,
    input: InputConfig,
    system_config: SystemConfig,
}

impl ApiService {
    pub fn new(
        engine: TouchpadEngine,
        pointer: Arc<dyn PointerActuator>,
        keyboard: Arc<dyn KeyboardActuator>,
        system: Arc<dyn SystemControl>,
        input: InputConfig,
        system_config: SystemConfig,
    ) -> Self {
        Self {
            engine,
            pointer,
            keyboard,
            system,
            input,
            system_config,
        }
    }

    pub fn engine(&self) -> &TouchpadEngine {
        &self.engine
    }

    /// Decodes `body`, runs the action on `route` and renders the result.
    pub fn handle(&self, route: Route, body: &[u8]) -> ApiResponse {
        let result = ApiRequest::parse(body)
            .map_err(DispatchError::from)
            .and_then(|request| {
                debug!(%route, action = %request.action, "api request");
                self.dispatch(route, &request)
            });

        match result {
            Ok(response) => response,
            Err(e) => {
                let status = e.http_status();
                if status >= 500 {
                    error!(%route, "request failed: {e}");
                } else {
                    warn!(%route, status, "request rejected: {e}");
                }
                ApiResponse::error(status, e.to_string())
            }
        }
    }

    fn dispatch(&self, route: Route, request: &ApiRequest) -> Result<ApiResponse, DispatchError> {
        match route {
            Route::Touchpad => touchpad::handle(&self.engine, request),
            Route::Mouse => mouse::handle(self.pointer.as_ref(), &self.input, request),
            Route::Keyboard => keyboard::handle(self.keyboard.as_ref(), &self.input, request),
            Route::System => system::handle(
                self.system.as_ref(),
                self.pointer.as_ref(),
                &self.system_config,
                request,
            ),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::system::MockSystemControl;
    use serde_json::Value;
    use touchpad_core::actuator::mock::RecordingActuator;
    use touchpad_core::scheduler::manual::ManualScheduler;
    use touchpad_core::{MouseButton, Scheduler, TouchpadConfig};

    fn make_service(system: MockSystemControl) -> (ApiService, Arc<RecordingActuator>) {
        let act = Arc::new(RecordingActuator::new());
        let engine = TouchpadEngine::new(
            TouchpadConfig::default(),
            Arc::clone(&act) as Arc<dyn PointerActuator>,
            Arc::new(ManualScheduler::new()) as Arc<dyn Scheduler>,
        );
        let service = ApiService::new(
            engine,
            Arc::clone(&act) as Arc<dyn PointerActuator>,
            Arc::clone(&act) as Arc<dyn KeyboardActuator>,
            Arc::new(system),
            InputConfig {
                hotkey_step_delay_ms: 0,
                drag_step_delay_ms: 0,
            },
            SystemConfig::default(),
        );
        (service, act)
    }

    #[test]
    fn test_route_from_path_ignores_query_and_trailing_slash() {
        assert_eq!(Route::from_path("/api/mouse"), Some(Route::Mouse));
        assert_eq!(Route::from_path("/api/touchpad/"), Some(Route::Touchpad));
        assert_eq!(Route::from_path("/api/system?x=1"), Some(Route::System));
        assert_eq!(Route::from_path("/api/unknown"), None);
    }

    #[test]
    fn test_malformed_body_is_400() {
        // Arrange
        let (service, _act) = make_service(MockSystemControl::new());

        // Act
        let resp = service.handle(Route::Mouse, b"not json");

        // Assert
        assert_eq!(resp.http_status, 400);
        assert!(!resp.is_success());
    }

    #[test]
    fn test_unsupported_action_is_400_with_action_name() {
        let (service, _act) = make_service(MockSystemControl::new());

        let resp = service.handle(Route::Keyboard, br#"{"action":"juggle"}"#);

        assert_eq!(resp.http_status, 400);
        assert_eq!(
            resp.get("message").and_then(Value::as_str),
            Some("unsupported action: juggle")
        );
    }

    #[test]
    fn test_touchpad_route_reaches_engine() {
        let (service, _act) = make_service(MockSystemControl::new());

        let resp = service.handle(
            Route::Touchpad,
            br#"{"action":"touch_start","touch_id":"t1","touches":[{"x":1,"y":2}]}"#,
        );

        assert!(resp.is_success());
        assert_eq!(service.engine().status().active_count, 1);
    }

    #[test]
    fn test_unknown_touch_is_400() {
        let (service, _act) = make_service(MockSystemControl::new());

        let resp = service.handle(
            Route::Touchpad,
            br#"{"action":"touch_move","touch_id":"ghost","touches":[{"x":1,"y":2}]}"#,
        );

        assert_eq!(resp.http_status, 400);
    }

    #[test]
    fn test_actuator_failure_is_500() {
        let (service, act) = make_service(MockSystemControl::new());
        act.set_should_fail(true);

        let resp = service.handle(Route::Mouse, br#"{"action":"scroll","dy":1}"#);

        assert_eq!(resp.http_status, 500);
    }

    #[test]
    fn test_unknown_button_is_400() {
        let (service, act) = make_service(MockSystemControl::new());

        let resp = service.handle(Route::Mouse, br#"{"action":"click","button":"thumb"}"#);

        assert_eq!(resp.http_status, 400);
        assert_eq!(act.click_count(MouseButton::Left), 0);
    }

    #[test]
    fn test_disabled_power_command_is_403() {
        let mut system = MockSystemControl::new();
        system.expect_shutdown().never();
        let (service, _act) = make_service(system);

        let resp = service.handle(Route::System, br#"{"action":"shutdown"}"#);

        assert_eq!(resp.http_status, 403);
    }
}
