//! `/api/mouse`: direct pointer control, bypassing gesture interpretation.

use std::str::FromStr;
use std::thread;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, warn};
use touchpad_core::{ActuatorError, MouseButton, PointerActuator};

use crate::application::dispatch::DispatchError;
use crate::domain::config::InputConfig;
use crate::domain::messages::{
    ApiRequest, ApiResponse, ButtonParams, DragParams, MoveParams, ScrollParams,
};

/// Most clicks one `click` request may ask for.
pub const MAX_CLICK_COUNT: u32 = 10;

pub fn handle(
    pointer: &dyn PointerActuator,
    input: &InputConfig,
    request: &ApiRequest,
) -> Result<ApiResponse, DispatchError> {
    match request.action.as_str() {
        "move" => {
            let params: MoveParams = request.params()?;
            let (Some(x), Some(y)) = (params.x, params.y) else {
                return Err(DispatchError::MissingParameter("x and y coordinates"));
            };
            if params.relative {
                pointer.move_by(x, y)?;
                Ok(ApiResponse::success().message(format!("cursor moved by ({x}, {y})")))
            } else {
                let (x, y) = (x.max(0.0), y.max(0.0));
                pointer.set_position(x, y)?;
                Ok(ApiResponse::success().message(format!("cursor moved to ({x}, {y})")))
            }
        }
        "click" => {
            let params: ButtonParams = request.params()?;
            let button = parse_button(params.button.as_deref())?;
            let count = params.count.unwrap_or(1);
            if !(1..=MAX_CLICK_COUNT).contains(&count) {
                return Err(DispatchError::InvalidParameter(format!(
                    "count must be between 1 and {MAX_CLICK_COUNT}, got {count}"
                )));
            }
            click(pointer, button, count)?;
            Ok(ApiResponse::success().message(format!("{button} clicked {count} time(s)")))
        }
        "press" => {
            let params: ButtonParams = request.params()?;
            let button = parse_button(params.button.as_deref())?;
            pointer.press(button)?;
            Ok(ApiResponse::success().message(format!("{button} button pressed")))
        }
        "release" => {
            let params: ButtonParams = request.params()?;
            let button = parse_button(params.button.as_deref())?;
            pointer.release(button)?;
            Ok(ApiResponse::success().message(format!("{button} button released")))
        }
        "scroll" => {
            let params: ScrollParams = request.params()?;
            pointer.scroll(params.dx, params.dy)?;
            Ok(ApiResponse::success()
                .message(format!("scrolled dx={}, dy={}", params.dx, params.dy)))
        }
        "drag" => {
            let params: DragParams = request.params()?;
            let (Some(sx), Some(sy), Some(ex), Some(ey)) =
                (params.start_x, params.start_y, params.end_x, params.end_y)
            else {
                return Err(DispatchError::MissingParameter(
                    "start_x, start_y, end_x and end_y",
                ));
            };
            drag(pointer, (sx, sy), (ex, ey), input.drag_step_delay())?;
            Ok(ApiResponse::success()
                .message(format!("dragged ({sx}, {sy}) -> ({ex}, {ey})")))
        }
        "position" => {
            let (x, y) = pointer.position()?;
            Ok(ApiResponse::success().with("position", json!({ "x": x, "y": y })))
        }
        "reset" => {
            release_all(pointer);
            Ok(ApiResponse::success().message("all mouse buttons released"))
        }
        other => Err(DispatchError::UnsupportedAction(other.to_string())),
    }
}

/// Parses an optional button name; absent means left.
fn parse_button(name: Option<&str>) -> Result<MouseButton, ActuatorError> {
    name.map_or(Ok(MouseButton::Left), MouseButton::from_str)
}

/// Clicks `count` times.  On failure every button is force-released so a
/// half-finished click cannot leave one held.
fn click(pointer: &dyn PointerActuator, button: MouseButton, count: u32) -> Result<(), ActuatorError> {
    for _ in 0..count {
        if let Err(e) = pointer.click(button) {
            release_all(pointer);
            return Err(e);
        }
    }
    Ok(())
}

/// Scripted press-move-release drag between two absolute points.
///
/// Once the press succeeded the left button is released even if moving to
/// the end point fails; the first error is returned.
pub fn drag(
    pointer: &dyn PointerActuator,
    (start_x, start_y): (f64, f64),
    (end_x, end_y): (f64, f64),
    step: Duration,
) -> Result<(), ActuatorError> {
    pointer.set_position(start_x, start_y)?;
    thread::sleep(step);
    pointer.press(MouseButton::Left)?;

    thread::sleep(step);
    let moved = pointer.set_position(end_x, end_y);
    thread::sleep(step);
    let released = pointer.release(MouseButton::Left);

    moved.and(released)
}

/// Releases every button, ignoring buttons that were not held.
pub fn release_all(pointer: &dyn PointerActuator) {
    for button in MouseButton::ALL {
        match pointer.release(button) {
            Ok(()) => debug!("{button} button released"),
            Err(ActuatorError::ButtonNotPressed(_)) => {}
            Err(e) => warn!("could not release {button} button: {e}"),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use serde_json::Value;
    use touchpad_core::actuator::mock::{ActuatorCall, RecordingActuator};
    use touchpad_core::actuator::MockPointerActuator;

    fn no_delay() -> InputConfig {
        InputConfig {
            hotkey_step_delay_ms: 0,
            drag_step_delay_ms: 0,
        }
    }

    fn request(body: &str) -> ApiRequest {
        ApiRequest::parse(body.as_bytes()).unwrap()
    }

    #[test]
    fn test_absolute_move_clamps_negative_coordinates() {
        // Arrange
        let act = RecordingActuator::new();

        // Act
        handle(&act, &no_delay(), &request(r#"{"action":"move","x":-20,"y":40}"#)).unwrap();

        // Assert
        assert_eq!(act.calls(), vec![ActuatorCall::SetPosition(0.0, 40.0)]);
    }

    #[test]
    fn test_relative_move_uses_move_by() {
        let act = RecordingActuator::new();

        handle(
            &act,
            &no_delay(),
            &request(r#"{"action":"move","x":-5,"y":3,"relative":true}"#),
        )
        .unwrap();

        assert_eq!(act.calls(), vec![ActuatorCall::MoveBy(-5.0, 3.0)]);
    }

    #[test]
    fn test_move_without_coordinates_is_missing_parameter() {
        let act = RecordingActuator::new();

        let result = handle(&act, &no_delay(), &request(r#"{"action":"move","x":1}"#));

        assert!(matches!(result, Err(DispatchError::MissingParameter(_))));
        assert!(act.calls().is_empty());
    }

    #[test]
    fn test_click_defaults_to_single_left_click() {
        let act = RecordingActuator::new();

        handle(&act, &no_delay(), &request(r#"{"action":"click"}"#)).unwrap();

        assert_eq!(act.calls(), vec![ActuatorCall::Click(MouseButton::Left)]);
    }

    #[test]
    fn test_double_right_click() {
        let act = RecordingActuator::new();

        handle(
            &act,
            &no_delay(),
            &request(r#"{"action":"click","button":"right","count":2}"#),
        )
        .unwrap();

        assert_eq!(act.click_count(MouseButton::Right), 2);
    }

    #[test]
    fn test_click_count_above_limit_is_rejected_without_clicking() {
        // Arrange
        let act = RecordingActuator::new();

        // Act
        let result = handle(
            &act,
            &no_delay(),
            &request(r#"{"action":"click","count":4000000000}"#),
        );

        // Assert
        let err = result.unwrap_err();
        assert!(matches!(err, DispatchError::InvalidParameter(_)));
        assert_eq!(err.http_status(), 400);
        assert!(act.calls().is_empty());
    }

    #[test]
    fn test_click_count_zero_is_rejected() {
        let act = RecordingActuator::new();

        let result = handle(&act, &no_delay(), &request(r#"{"action":"click","count":0}"#));

        assert!(matches!(result, Err(DispatchError::InvalidParameter(_))));
        assert!(act.calls().is_empty());
    }

    #[test]
    fn test_click_count_at_limit_is_accepted() {
        let act = RecordingActuator::new();
        let body = format!(r#"{{"action":"click","count":{MAX_CLICK_COUNT}}}"#);

        handle(&act, &no_delay(), &request(&body)).unwrap();

        assert_eq!(act.click_count(MouseButton::Left), MAX_CLICK_COUNT as usize);
    }

    #[test]
    fn test_failed_click_force_releases_all_buttons() {
        // Arrange: click fails, every release is observed
        let mut mock = MockPointerActuator::new();
        mock.expect_click()
            .with(eq(MouseButton::Left))
            .times(1)
            .returning(|_| Err(ActuatorError::Platform("stuck".into())));
        mock.expect_release()
            .times(3)
            .returning(|b| Err(ActuatorError::ButtonNotPressed(b)));

        // Act
        let result = handle(&mock, &no_delay(), &request(r#"{"action":"click","count":3}"#));

        // Assert
        assert!(matches!(result, Err(DispatchError::Actuator(_))));
    }

    #[test]
    fn test_drag_presses_moves_and_releases_in_order() {
        let act = RecordingActuator::new();

        handle(
            &act,
            &no_delay(),
            &request(r#"{"action":"drag","start_x":10,"start_y":20,"end_x":300,"end_y":400}"#),
        )
        .unwrap();

        assert_eq!(
            act.calls(),
            vec![
                ActuatorCall::SetPosition(10.0, 20.0),
                ActuatorCall::Press(MouseButton::Left),
                ActuatorCall::SetPosition(300.0, 400.0),
                ActuatorCall::Release(MouseButton::Left),
            ]
        );
    }

    #[test]
    fn test_drag_releases_button_when_final_move_fails() {
        let mut mock = MockPointerActuator::new();
        let mut moves = 0;
        mock.expect_set_position().times(2).returning(move |_, _| {
            moves += 1;
            if moves == 2 {
                Err(ActuatorError::Platform("out of bounds".into()))
            } else {
                Ok(())
            }
        });
        mock.expect_press().times(1).returning(|_| Ok(()));
        mock.expect_release().times(1).returning(|_| Ok(()));

        let result = drag(&mock, (0.0, 0.0), (9.0, 9.0), Duration::ZERO);

        assert_eq!(result, Err(ActuatorError::Platform("out of bounds".into())));
    }

    #[test]
    fn test_drag_missing_coordinate_is_rejected() {
        let act = RecordingActuator::new();

        let result = handle(
            &act,
            &no_delay(),
            &request(r#"{"action":"drag","start_x":1,"start_y":1,"end_x":2}"#),
        );

        assert!(matches!(result, Err(DispatchError::MissingParameter(_))));
        assert!(act.calls().is_empty());
    }

    #[test]
    fn test_position_reports_cursor() {
        let act = RecordingActuator::new();
        act.set_position(12.0, 34.0).unwrap();

        let resp = handle(&act, &no_delay(), &request(r#"{"action":"position"}"#)).unwrap();

        let pos = resp.get("position").cloned().unwrap_or(Value::Null);
        assert_eq!(pos["x"], 12.0);
        assert_eq!(pos["y"], 34.0);
    }

    #[test]
    fn test_reset_releases_held_buttons_only() {
        let act = RecordingActuator::new();
        act.press(MouseButton::Middle).unwrap();

        handle(&act, &no_delay(), &request(r#"{"action":"reset"}"#)).unwrap();

        assert!(!act.is_held(MouseButton::Middle));
        assert_eq!(
            act.button_transitions(),
            vec![
                ActuatorCall::Press(MouseButton::Middle),
                ActuatorCall::Release(MouseButton::Middle),
            ]
        );
    }

    #[test]
    fn test_scroll_passes_amounts_through() {
        let act = RecordingActuator::new();

        handle(&act, &no_delay(), &request(r#"{"action":"scroll","dx":1.5,"dy":-2}"#)).unwrap();

        assert_eq!(act.calls(), vec![ActuatorCall::Scroll(1.5, -2.0)]);
    }
}
