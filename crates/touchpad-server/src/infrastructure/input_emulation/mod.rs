//! Pointer and keyboard backends.
//!
//! - [`logging::LoggingActuator`] logs every call against a virtual cursor.
//! - `native::NativeActuator` (feature `native-input`) injects real OS input
//!   through `enigo`.
//!
//! [`create_backend`] picks one at startup.  A native backend that fails to
//! initialise degrades to logging so the server still starts.

use std::sync::Arc;

use tracing::info;
#[cfg(feature = "native-input")]
use tracing::warn;
use touchpad_core::{KeyboardActuator, PointerActuator};

pub mod logging;

#[cfg(feature = "native-input")]
pub mod native;

use logging::LoggingActuator;

/// The pointer and keyboard halves of one backend.
#[derive(Clone)]
pub struct InputBackend {
    pub name: &'static str,
    pub pointer: Arc<dyn PointerActuator>,
    pub keyboard: Arc<dyn KeyboardActuator>,
}

impl InputBackend {
    fn logging() -> Self {
        let actuator = Arc::new(LoggingActuator::new());
        Self {
            name: "logging",
            pointer: actuator.clone(),
            keyboard: actuator,
        }
    }
}

/// Builds the input backend.
///
/// With `dry_run` (or without the `native-input` feature) input is only
/// logged.
pub fn create_backend(dry_run: bool) -> InputBackend {
    let backend = if dry_run {
        InputBackend::logging()
    } else {
        native_or_logging()
    };
    info!(backend = backend.name, "input backend ready");
    backend
}

#[cfg(feature = "native-input")]
fn native_or_logging() -> InputBackend {
    match native::NativeActuator::new() {
        Ok(actuator) => {
            let actuator = Arc::new(actuator);
            InputBackend {
                name: "native",
                pointer: actuator.clone(),
                keyboard: actuator,
            }
        }
        Err(e) => {
            warn!("native input unavailable, falling back to logging: {e}");
            InputBackend::logging()
        }
    }
}

#[cfg(not(feature = "native-input"))]
fn native_or_logging() -> InputBackend {
    InputBackend::logging()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
