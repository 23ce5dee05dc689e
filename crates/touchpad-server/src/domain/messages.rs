//! JSON request and response shapes of the HTTP API.
//!
//! Every API route takes a `POST` body that is a JSON object with an
//! `"action"` field; the remaining fields are the action's parameters:
//!
//! ```json
//! {"action": "move", "x": 10, "y": -4, "relative": true}
//! ```
//!
//! Every response body is a JSON object with a `"status"` field of
//! `"success"` or `"error"`, plus action-specific fields:
//!
//! ```json
//! {"status": "success", "mode": "single", "dx": 2.0, "dy": -1.0}
//! {"status": "error", "message": "unknown touch id: t9"}
//! ```
//!
//! Parameters are decoded in two steps.  [`ApiRequest::parse`] only finds
//! the action; the route then asks for the parameter struct that action
//! needs with [`ApiRequest::params`].  This keeps "bad JSON", "unsupported
//! action" and "missing field" distinguishable.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Failure to decode a request body.
#[derive(Debug, Error, PartialEq)]
pub enum RequestError {
    /// The body is not a non-empty JSON object.
    #[error("invalid request data: {0}")]
    InvalidBody(String),

    /// The object has no string `action` field.
    #[error("missing action")]
    MissingAction,

    /// The action's parameters do not have the expected types.
    #[error("invalid parameters for {action}: {reason}")]
    InvalidParams { action: String, reason: String },
}

/// A decoded API request: the action name plus its raw parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub action: String,
    params: Value,
}

impl ApiRequest {
    /// Decodes a request body.
    ///
    /// # Errors
    ///
    /// - [`RequestError::InvalidBody`] for malformed JSON, a non-object, or
    ///   an empty object.
    /// - [`RequestError::MissingAction`] when `action` is absent or not a
    ///   string.
    pub fn parse(body: &[u8]) -> Result<Self, RequestError> {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| RequestError::InvalidBody(e.to_string()))?;

        let action = match &value {
            Value::Object(map) if map.is_empty() => {
                return Err(RequestError::InvalidBody("empty object".into()))
            }
            Value::Object(map) => map.get("action").and_then(Value::as_str),
            _ => return Err(RequestError::InvalidBody("expected a JSON object".into())),
        };
        let action = action.ok_or(RequestError::MissingAction)?.to_string();

        Ok(Self {
            action,
            params: value,
        })
    }

    /// Decodes the request's parameters as `T`.
    ///
    /// The `action` field itself is ignored by `T` unless it declares it.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidParams`] when a field has the wrong type.
    pub fn params<T: DeserializeOwned>(&self) -> Result<T, RequestError> {
        T::deserialize(&self.params).map_err(|e| RequestError::InvalidParams {
            action: self.action.clone(),
            reason: e.to_string(),
        })
    }
}

// ── Parameter structs ─────────────────────────────────────────────────────────

/// `mouse/move`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MoveParams {
    pub x: Option<f64>,
    pub y: Option<f64>,
    #[serde(default)]
    pub relative: bool,
}

/// `mouse/click`, `mouse/press`, `mouse/release`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ButtonParams {
    pub button: Option<String>,
    pub count: Option<u32>,
}

/// `mouse/scroll`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScrollParams {
    #[serde(default)]
    pub dx: f64,
    #[serde(default)]
    pub dy: f64,
}

/// `mouse/drag`.  All four coordinates are required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DragParams {
    pub start_x: Option<f64>,
    pub start_y: Option<f64>,
    pub end_x: Option<f64>,
    pub end_y: Option<f64>,
}

/// `keyboard/press`, `keyboard/release`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeyParams {
    pub key: Option<String>,
}

/// `keyboard/type`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextParams {
    pub text: Option<String>,
}

/// `keyboard/hotkey`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HotkeyParams {
    pub keys: Option<Vec<String>>,
}

// ── Responses ─────────────────────────────────────────────────────────────────

/// A response body plus the HTTP status it is sent with.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub http_status: u16,
    pub body: Map<String, Value>,
}

impl ApiResponse {
    /// `200 {"status":"success"}`.
    pub fn success() -> Self {
        let mut body = Map::new();
        body.insert("status".into(), Value::from("success"));
        Self {
            http_status: 200,
            body,
        }
    }

    /// `{"status":"error","message":...}` with the given HTTP status.
    pub fn error(http_status: u16, message: impl Into<String>) -> Self {
        let mut body = Map::new();
        body.insert("status".into(), Value::from("error"));
        body.insert("message".into(), Value::from(message.into()));
        Self { http_status, body }
    }

    /// Adds a human-readable `message` field.
    #[must_use]
    pub fn message(self, message: impl Into<String>) -> Self {
        self.with("message", message.into())
    }

    /// Adds a field.  Values that cannot be represented as JSON become `null`.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.body.insert(key.to_string(), value);
        self
    }

    pub fn is_success(&self) -> bool {
        self.body.get("status").and_then(Value::as_str) == Some("success")
    }

    /// Looks up a top-level field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    /// Serializes the body.
    pub fn to_json(&self) -> String {
        Value::Object(self.body.clone()).to_string()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
