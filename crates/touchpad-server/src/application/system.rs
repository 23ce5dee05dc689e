//! `/api/system`: screen lock, power commands and host information.
//!
//! The OS work is behind [`SystemControl`]; this module decides what is
//! allowed and shapes the response.  Power commands are refused unless
//! `system.allow_power_commands` is set.

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use touchpad_core::PointerActuator;

use crate::application::dispatch::DispatchError;
use crate::domain::config::SystemConfig;
use crate::domain::messages::{ApiRequest, ApiResponse};

/// Screen size reported when the pointer backend cannot tell.
pub const FALLBACK_SCREEN_SIZE: (u32, u32) = (1920, 1080);

/// Failure of a host-level operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SystemError {
    #[error("system command failed: {0}")]
    CommandFailed(String),

    #[error("{0} is disabled by configuration")]
    NotPermitted(&'static str),

    #[error("not available on this host: {0}")]
    Unavailable(String),
}

/// Static facts about the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostDetails {
    pub platform: String,
    pub version: String,
    pub machine: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
struct ScreenSize {
    width: u32,
    height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct SystemStatus {
    #[serde(flatten)]
    host: HostDetails,
    screen_size: ScreenSize,
}

/// Host session and power control.
#[cfg_attr(test, mockall::automock)]
pub trait SystemControl: Send + Sync {
    /// Locks the interactive session.  Returns a description of the
    /// mechanism that worked.
    fn lock_screen(&self) -> Result<String, SystemError>;

    fn shutdown(&self) -> Result<(), SystemError>;

    fn restart(&self) -> Result<(), SystemError>;

    fn host_details(&self) -> HostDetails;
}

pub fn handle(
    system: &dyn SystemControl,
    pointer: &dyn PointerActuator,
    config: &SystemConfig,
    request: &ApiRequest,
) -> Result<ApiResponse, DispatchError> {
    match request.action.as_str() {
        "lock" => {
            let how = system.lock_screen()?;
            info!("screen locked via {how}");
            Ok(ApiResponse::success().message(format!("screen locked: {how}")))
        }
        "shutdown" => {
            if !config.allow_power_commands {
                return Err(SystemError::NotPermitted("shutdown").into());
            }
            system.shutdown()?;
            Ok(ApiResponse::success().message("shutdown command issued"))
        }
        "restart" => {
            if !config.allow_power_commands {
                return Err(SystemError::NotPermitted("restart").into());
            }
            system.restart()?;
            Ok(ApiResponse::success().message("restart command issued"))
        }
        "status" => {
            let (width, height) = pointer.display_size().unwrap_or_else(|e| {
                warn!("screen size unavailable, using fallback: {e}");
                FALLBACK_SCREEN_SIZE
            });
            let status = SystemStatus {
                host: system.host_details(),
                screen_size: ScreenSize { width, height },
            };
            Ok(ApiResponse::success().with("data", status))
        }
        other => Err(DispatchError::UnsupportedAction(other.to_string())),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
