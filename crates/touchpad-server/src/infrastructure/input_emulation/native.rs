//! OS input injection through `enigo`.
//!
//! `enigo` works in whole pixels and whole wheel notches, while phone deltas
//! are fractional.  Sub-unit remainders are carried into the next call so a
//! slow finger still moves the cursor and fine scrolls still add up.
//!
//! Key names follow the phone UI's vocabulary (`"ctrl"`, `"enter"`,
//! `"page_down"`, `"f5"`, single characters); see [`key_from_name`].

use std::sync::{Mutex, MutexGuard, PoisonError};

use enigo::{Axis, Button, Coordinate, Direction, Enigo, Key, Keyboard, Mouse, Settings};
use tracing::debug;
use touchpad_core::{ActuatorError, KeyboardActuator, MouseButton, PointerActuator};

/// Carries the fractional part of deltas between calls.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Remainder {
    x: f64,
    y: f64,
}

impl Remainder {
    /// Adds `(dx, dy)` and takes out the whole units.
    fn take_whole(&mut self, dx: f64, dy: f64) -> (i32, i32) {
        self.x += dx;
        self.y += dy;
        let whole_x = self.x.trunc();
        let whole_y = self.y.trunc();
        self.x -= whole_x;
        self.y -= whole_y;
        (whole_x as i32, whole_y as i32)
    }
}

struct NativeState {
    enigo: Enigo,
    motion: Remainder,
    wheel: Remainder,
}

pub struct NativeActuator {
    state: Mutex<NativeState>,
}

impl NativeActuator {
    /// Connects to the platform input system.
    ///
    /// # Errors
    ///
    /// [`ActuatorError::Platform`] when no display server or input portal is
    /// reachable.
    pub fn new() -> Result<Self, ActuatorError> {
        let enigo = Enigo::new(&Settings::default()).map_err(platform)?;
        debug!("native input backend initialised");
        Ok(Self {
            state: Mutex::new(NativeState {
                enigo,
                motion: Remainder::default(),
                wheel: Remainder::default(),
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, NativeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn button(&self, button: MouseButton, direction: Direction) -> Result<(), ActuatorError> {
        self.lock()
            .enigo
            .button(to_enigo_button(button), direction)
            .map_err(platform)
    }

    fn key(&self, name: &str, direction: Direction) -> Result<(), ActuatorError> {
        let key = key_from_name(name)?;
        self.lock().enigo.key(key, direction).map_err(platform)
    }
}

impl PointerActuator for NativeActuator {
    fn move_by(&self, dx: f64, dy: f64) -> Result<(), ActuatorError> {
        let mut state = self.lock();
        let (x, y) = state.motion.take_whole(dx, dy);
        if x == 0 && y == 0 {
            return Ok(());
        }
        state.enigo.move_mouse(x, y, Coordinate::Rel).map_err(platform)
    }

    fn set_position(&self, x: f64, y: f64) -> Result<(), ActuatorError> {
        let mut state = self.lock();
        state.motion = Remainder::default();
        state
            .enigo
            .move_mouse(x.round() as i32, y.round() as i32, Coordinate::Abs)
            .map_err(platform)
    }

    fn position(&self) -> Result<(f64, f64), ActuatorError> {
        let (x, y) = self.lock().enigo.location().map_err(platform)?;
        Ok((f64::from(x), f64::from(y)))
    }

    fn press(&self, button: MouseButton) -> Result<(), ActuatorError> {
        self.button(button, Direction::Press)
    }

    fn release(&self, button: MouseButton) -> Result<(), ActuatorError> {
        self.button(button, Direction::Release)
    }

    fn click(&self, button: MouseButton) -> Result<(), ActuatorError> {
        self.button(button, Direction::Click)
    }

    fn scroll(&self, dx: f64, dy: f64) -> Result<(), ActuatorError> {
        let mut state = self.lock();
        let (x, y) = state.wheel.take_whole(dx, dy);
        // enigo scrolls down for positive lengths.
        if y != 0 {
            state.enigo.scroll(-y, Axis::Vertical).map_err(platform)?;
        }
        if x != 0 {
            state.enigo.scroll(x, Axis::Horizontal).map_err(platform)?;
        }
        Ok(())
    }

    fn display_size(&self) -> Result<(u32, u32), ActuatorError> {
        let (w, h) = self.lock().enigo.main_display().map_err(platform)?;
        let w = u32::try_from(w).map_err(|_| ActuatorError::Platform(format!("bad width {w}")))?;
        let h = u32::try_from(h).map_err(|_| ActuatorError::Platform(format!("bad height {h}")))?;
        Ok((w, h))
    }
}

impl KeyboardActuator for NativeActuator {
    fn press_key(&self, key: &str) -> Result<(), ActuatorError> {
        self.key(key, Direction::Press)
    }

    fn release_key(&self, key: &str) -> Result<(), ActuatorError> {
        self.key(key, Direction::Release)
    }

    fn type_text(&self, text: &str) -> Result<(), ActuatorError> {
        self.lock().enigo.text(text).map_err(platform)
    }
}

fn platform(e: impl std::fmt::Display) -> ActuatorError {
    ActuatorError::Platform(e.to_string())
}

fn to_enigo_button(button: MouseButton) -> Button {
    match button {
        MouseButton::Left => Button::Left,
        MouseButton::Right => Button::Right,
        MouseButton::Middle => Button::Middle,
    }
}

/// Maps a symbolic key name to an `enigo` key.  Case-insensitive.
pub fn key_from_name(name: &str) -> Result<Key, ActuatorError> {
    let lower = name.to_ascii_lowercase();
    let key = match lower.as_str() {
        "ctrl" | "control" => Key::Control,
        "shift" => Key::Shift,
        "alt" | "option" => Key::Alt,
        "win" | "cmd" | "command" | "meta" | "super" => Key::Meta,
        "tab" => Key::Tab,
        "enter" | "return" => Key::Return,
        "space" => Key::Space,
        "backspace" => Key::Backspace,
        "delete" | "del" => Key::Delete,
        "escape" | "esc" => Key::Escape,
        "capslock" => Key::CapsLock,
        "up" => Key::UpArrow,
        "down" => Key::DownArrow,
        "left" => Key::LeftArrow,
        "right" => Key::RightArrow,
        "home" => Key::Home,
        "end" => Key::End,
        "pageup" | "page_up" => Key::PageUp,
        "pagedown" | "page_down" => Key::PageDown,
        "f1" => Key::F1,
        "f2" => Key::F2,
        "f3" => Key::F3,
        "f4" => Key::F4,
        "f5" => Key::F5,
        "f6" => Key::F6,
        "f7" => Key::F7,
        "f8" => Key::F8,
        "f9" => Key::F9,
        "f10" => Key::F10,
        "f11" => Key::F11,
        "f12" => Key::F12,
        _ => {
            let mut chars = name.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Key::Unicode(c),
                _ => return Err(ActuatorError::Platform(format!("unknown key: {name}"))),
            }
        }
    };
    Ok(key)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
