//! Gesture tuning constants.
//!
//! [`TouchpadConfig`] is a plain struct handed to the engine at construction.
//! It deserializes from a TOML/JSON table in which every field is optional:
//!
//! ```toml
//! [touchpad]
//! click_delay_ms = 150
//! double_click_time_ms = 300
//! move_threshold = 5.0
//! cursor_sensitivity = 2.0
//! scroll_sensitivity = 0.1
//! ```
//!
//! Delays are written in whole milliseconds on disk and held as
//! [`Duration`] in memory.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Delays, threshold and sensitivities used by the gesture engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TouchpadConfig {
    /// How long a one-finger tap waits before it becomes a left click.
    #[serde(rename = "click_delay_ms", with = "duration_ms")]
    pub click_delay: Duration,

    /// Longest two-finger contact that still counts as a right-click tap.
    #[serde(rename = "double_click_time_ms", with = "duration_ms")]
    pub double_click_time: Duration,

    /// Largest distance from the anchor that still counts as a tap.
    pub move_threshold: f64,

    /// Cursor pixels per client unit of finger travel.
    pub cursor_sensitivity: f64,

    /// Wheel units per client unit of two-finger travel.
    pub scroll_sensitivity: f64,
}

impl Default for TouchpadConfig {
    /// | Field                | Default |
    /// |----------------------|---------|
    /// | `click_delay`        | 150 ms  |
    /// | `double_click_time`  | 300 ms  |
    /// | `move_threshold`     | 5       |
    /// | `cursor_sensitivity` | 2.0     |
    /// | `scroll_sensitivity` | 0.1     |
    fn default() -> Self {
        Self {
            click_delay: Duration::from_millis(150),
            double_click_time: Duration::from_millis(300),
            move_threshold: 5.0,
            cursor_sensitivity: 2.0,
            scroll_sensitivity: 0.1,
        }
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
