//! Touch sample schema and gesture classification.
//!
//! The browser sends one JSON object per touch event.  Only three fields
//! matter to the engine:
//!
//! ```json
//! {"touch_id": "t1", "touches": [{"x": 100, "y": 120}], "touch_count": 1}
//! ```
//!
//! - `touch_id` names the finger group; it defaults to `"default"`.
//! - `touches` is the list of finger positions; only the first is used for
//!   cursor tracking.
//! - `touch_count` is optional and, when present, overrides
//!   `touches.len()` for classification.  Browsers sometimes report fewer
//!   positions than fingers, so the explicit count wins.
//!
//! camelCase spellings (`touchId`, `touchCount`) are accepted as aliases.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Touch id used when the client omits `touch_id`.
pub const DEFAULT_TOUCH_ID: &str = "default";

/// One finger position in client-reported units (CSS pixels on a phone).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

impl TouchPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A decoded touch sample as received from the browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    #[serde(default = "default_touch_id", alias = "touchId")]
    pub touch_id: String,

    #[serde(default)]
    pub touches: Vec<TouchPoint>,

    /// Explicit finger count.  A non-integer value decodes as `Some(0)`,
    /// which classifies as [`TouchMode::Single`].
    #[serde(
        default,
        alias = "touchCount",
        deserialize_with = "lenient_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub touch_count: Option<i64>,
}

fn default_touch_id() -> String {
    DEFAULT_TOUCH_ID.to_string()
}

/// Accepts integers, floats (truncated) and anything else (treated as 0).
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawCount {
        Int(i64),
        Float(f64),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Option::<RawCount>::deserialize(deserializer)? {
        None => None,
        Some(RawCount::Int(n)) => Some(n),
        Some(RawCount::Float(f)) => Some(f as i64),
        Some(RawCount::Other(_)) => Some(0),
    })
}

impl TouchEvent {
    /// Builds a sample for `touch_id` with the given finger positions.
    pub fn new(touch_id: impl Into<String>, touches: Vec<TouchPoint>) -> Self {
        Self {
            touch_id: touch_id.into(),
            touches,
            touch_count: None,
        }
    }

    /// Builds an end-of-gesture sample (no positions) for `touch_id`.
    pub fn lifted(touch_id: impl Into<String>) -> Self {
        Self::new(touch_id, Vec::new())
    }

    /// Sets the explicit finger count.
    #[must_use]
    pub fn with_touch_count(mut self, count: i64) -> Self {
        self.touch_count = Some(count);
        self
    }

    /// The finger count used for classification.
    pub fn finger_count(&self) -> i64 {
        self.touch_count
            .unwrap_or_else(|| i64::try_from(self.touches.len()).unwrap_or(i64::MAX))
    }

    /// The first reported finger position, if any.
    pub fn primary_point(&self) -> Option<TouchPoint> {
        self.touches.first().copied()
    }

    /// The mode this sample classifies as.
    pub fn mode(&self) -> TouchMode {
        classify(self.finger_count())
    }
}

/// What a touch sample means, derived from its finger count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchMode {
    /// One finger: cursor movement and tap-to-click.
    Single,
    /// Two fingers: wheel scrolling and tap-to-right-click.
    Scroll,
    /// Three or more fingers: left-button drag.
    Dragging,
}

impl TouchMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TouchMode::Single => "single",
            TouchMode::Scroll => "scroll",
            TouchMode::Dragging => "dragging",
        }
    }
}

impl fmt::Display for TouchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a finger count to a [`TouchMode`].
///
/// Zero or negative counts fall back to [`TouchMode::Single`].
pub fn classify(touch_count: i64) -> TouchMode {
    match touch_count {
        2 => TouchMode::Scroll,
        n if n >= 3 => TouchMode::Dragging,
        _ => TouchMode::Single,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
