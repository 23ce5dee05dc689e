//! Server configuration schema.
//!
//! [`ServerConfig`] is the in-memory form of `config.toml`:
//!
//! ```toml
//! [server]
//! bind_address = "0.0.0.0"
//! port = 8088
//! log_level = "info"
//! static_dir = "templates"
//! worker_threads = 4
//!
//! [touchpad]
//! click_delay_ms = 150
//! double_click_time_ms = 300
//! move_threshold = 5.0
//! cursor_sensitivity = 2.0
//! scroll_sensitivity = 0.1
//!
//! [input]
//! hotkey_step_delay_ms = 100
//! drag_step_delay_ms = 100
//!
//! [system]
//! allow_power_commands = false
//! ```
//!
//! Every section and every field is optional.  Missing values take the
//! defaults returned by the `default_*` helpers below, so an empty file (or
//! no file at all) is a valid configuration.
//!
//! Reading the file from disk is the infrastructure layer's job; see
//! `infrastructure::config_store`.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use touchpad_core::TouchpadConfig;

/// Top-level service configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: HttpConfig,
    #[serde(default)]
    pub touchpad: TouchpadConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub system: SystemConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// IP address to bind.  `"0.0.0.0"` accepts phones on the LAN.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Fallback `tracing` filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Directory holding the phone UI (`index.html` and assets).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<PathBuf>,
    /// Number of threads pulling requests off the listener.
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,
}

/// Pacing of multi-step input sequences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Pause between key presses of a hotkey, and before releasing it.
    #[serde(default = "default_step_delay_ms")]
    pub hotkey_step_delay_ms: u64,
    /// Pause between the steps of a scripted mouse drag.
    #[serde(default = "default_step_delay_ms")]
    pub drag_step_delay_ms: u64,
}

/// Host power and session controls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Whether `shutdown` and `restart` requests are honoured.
    #[serde(default)]
    pub allow_power_commands: bool,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8088
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_worker_threads() -> usize {
    4
}
fn default_step_delay_ms() -> u64 {
    100
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            log_level: default_log_level(),
            static_dir: None,
            worker_threads: default_worker_threads(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            hotkey_step_delay_ms: default_step_delay_ms(),
            drag_step_delay_ms: default_step_delay_ms(),
        }
    }
}

impl HttpConfig {
    /// The socket address to listen on.
    ///
    /// Returns `None` when `bind_address` is not an IP literal.
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        let ip: IpAddr = self.bind_address.parse().ok()?;
        Some(SocketAddr::new(ip, self.port))
    }
}

impl InputConfig {
    pub fn hotkey_step_delay(&self) -> Duration {
        Duration::from_millis(self.hotkey_step_delay_ms)
    }

    pub fn drag_step_delay(&self) -> Duration {
        Duration::from_millis(self.drag_step_delay_ms)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
