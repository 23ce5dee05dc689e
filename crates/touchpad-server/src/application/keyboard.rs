//! `/api/keyboard`: key presses, text entry and hotkey chords.

use std::thread;
use std::time::Duration;

use tracing::warn;
use touchpad_core::{ActuatorError, KeyboardActuator};

use crate::application::dispatch::DispatchError;
use crate::domain::config::InputConfig;
use crate::domain::messages::{ApiRequest, ApiResponse, HotkeyParams, KeyParams, TextParams};

pub fn handle(
    keyboard: &dyn KeyboardActuator,
    input: &InputConfig,
    request: &ApiRequest,
) -> Result<ApiResponse, DispatchError> {
    match request.action.as_str() {
        "press" => {
            let key = required_key(request)?;
            keyboard.press_key(&key)?;
            Ok(ApiResponse::success().message(format!("key {key} pressed")))
        }
        "release" => {
            let key = required_key(request)?;
            keyboard.release_key(&key)?;
            Ok(ApiResponse::success().message(format!("key {key} released")))
        }
        "type" => {
            let params: TextParams = request.params()?;
            let text = params
                .text
                .filter(|t| !t.is_empty())
                .ok_or(DispatchError::MissingParameter("text"))?;
            keyboard.type_text(&text)?;
            Ok(ApiResponse::success().message(format!("typed {} characters", text.chars().count())))
        }
        "hotkey" => {
            let params: HotkeyParams = request.params()?;
            let keys = params
                .keys
                .filter(|k| !k.is_empty())
                .ok_or(DispatchError::MissingParameter("keys"))?;
            hotkey(keyboard, &keys, input.hotkey_step_delay())?;
            Ok(ApiResponse::success().message(format!("hotkey {} sent", keys.join("+"))))
        }
        other => Err(DispatchError::UnsupportedAction(other.to_string())),
    }
}

fn required_key(request: &ApiRequest) -> Result<String, DispatchError> {
    let params: KeyParams = request.params()?;
    params
        .key
        .filter(|k| !k.is_empty())
        .ok_or(DispatchError::MissingParameter("key"))
}

/// Presses `keys` in order, then releases them in reverse order.
///
/// `step` is slept after every press and once more before the releases.
/// If a press fails, the keys already down are released (in reverse) before
/// the error is returned.  Release failures are logged; the first one is
/// returned after every key has been tried.
pub fn hotkey(
    keyboard: &dyn KeyboardActuator,
    keys: &[String],
    step: Duration,
) -> Result<(), ActuatorError> {
    let mut pressed: Vec<&str> = Vec::with_capacity(keys.len());

    for key in keys {
        if let Err(e) = keyboard.press_key(key) {
            warn!("hotkey: pressing {key} failed: {e}");
            // Report the press failure; cleanup failures are only logged.
            let _ = release_reversed(keyboard, &pressed);
            return Err(e);
        }
        pressed.push(key);
        thread::sleep(step);
    }

    thread::sleep(step);
    release_reversed(keyboard, &pressed)
}

fn release_reversed(keyboard: &dyn KeyboardActuator, pressed: &[&str]) -> Result<(), ActuatorError> {
    let mut first_error = None;
    for key in pressed.iter().rev() {
        if let Err(e) = keyboard.release_key(key) {
            warn!("hotkey: releasing {key} failed: {e}");
            first_error.get_or_insert(e);
        }
    }
    first_error.map_or(Ok(()), Err)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
