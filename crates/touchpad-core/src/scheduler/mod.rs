//! Timer capability used for delayed clicks.
//!
//! The engine needs two things from "time": a monotonic clock to measure how
//! long a gesture lasted, and a way to run a callback after a delay.  Both
//! come from one injected [`Scheduler`] so that a fake clock in tests moves
//! durations and timers together.
//!
//! - Production uses a Tokio-backed scheduler (server crate).
//! - Tests use [`manual::ManualScheduler`], which only advances when told to.
//!
//! # Threading contract
//!
//! `schedule` and `cancel` may be called from any thread, including while the
//! caller holds its own locks.  Implementations must therefore never run a
//! callback while holding an internal lock, and must never run it inline from
//! `schedule`.

use std::time::{Duration, Instant};

pub mod manual;

/// Work run once when a timer expires.
pub type TimerCallback = Box<dyn FnOnce() + Send + 'static>;

/// Opaque identifier of a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

/// Delayed-callback scheduling plus the monotonic clock it runs on.
pub trait Scheduler: Send + Sync {
    /// Current monotonic time.
    fn now(&self) -> Instant;

    /// Runs `callback` once after `delay`, unless cancelled first.
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle;

    /// Prevents a scheduled callback from running.  Cancelling an unknown or
    /// already-fired handle is a no-op.
    fn cancel(&self, handle: TimerHandle);
}
