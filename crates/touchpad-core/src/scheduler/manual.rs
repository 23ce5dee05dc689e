//! Deterministic scheduler driven by explicit clock advances.
//!
//! Time only moves when a test calls [`ManualScheduler::advance`].  Timers
//! that fall due during an advance run in due order on the calling thread,
//! after the scheduler's own lock has been released, so a callback may take
//! other locks or schedule further timers.
//!
//! ```
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use std::time::Duration;
//! use touchpad_core::scheduler::{manual::ManualScheduler, Scheduler};
//!
//! let sched = ManualScheduler::new();
//! let fired = Arc::new(AtomicUsize::new(0));
//! let f = Arc::clone(&fired);
//! sched.schedule(Duration::from_millis(150), Box::new(move || {
//!     f.fetch_add(1, Ordering::SeqCst);
//! }));
//!
//! sched.advance(Duration::from_millis(149));
//! assert_eq!(fired.load(Ordering::SeqCst), 0);
//! sched.advance(Duration::from_millis(1));
//! assert_eq!(fired.load(Ordering::SeqCst), 1);
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use super::{Scheduler, TimerCallback, TimerHandle};

struct ManualTimer {
    handle: TimerHandle,
    due: Duration,
    callback: TimerCallback,
}

#[derive(Default)]
struct ManualState {
    elapsed: Duration,
    next_id: u64,
    timers: Vec<ManualTimer>,
}

/// A scheduler whose clock only advances on request.
pub struct ManualScheduler {
    origin: Instant,
    state: Mutex<ManualState>,
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            state: Mutex::new(ManualState::default()),
        }
    }

    /// Moves the clock forward by `by`, running every timer that falls due.
    ///
    /// Returns the number of callbacks that ran.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.lock().elapsed + by;
        let mut fired = 0;

        loop {
            let next = {
                let mut state = self.lock();
                let due_index = state
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= target)
                    .min_by_key(|(_, t)| (t.due, t.handle))
                    .map(|(i, _)| i);

                match due_index {
                    Some(i) => {
                        let timer = state.timers.swap_remove(i);
                        state.elapsed = state.elapsed.max(timer.due);
                        Some(timer.callback)
                    }
                    None => {
                        state.elapsed = target;
                        None
                    }
                }
            };

            match next {
                Some(callback) => {
                    callback();
                    fired += 1;
                }
                None => break,
            }
        }

        fired
    }

    /// Time advanced since construction.
    pub fn elapsed(&self) -> Duration {
        self.lock().elapsed
    }

    /// Number of timers scheduled and not yet fired or cancelled.
    pub fn pending(&self) -> usize {
        self.lock().timers.len()
    }

    fn lock(&self) -> MutexGuard<'_, ManualState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> Instant {
        self.origin + self.lock().elapsed
    }

    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        let mut state = self.lock();
        state.next_id += 1;
        let handle = TimerHandle::from_raw(state.next_id);
        let due = state.elapsed + delay;
        state.timers.push(ManualTimer {
            handle,
            due,
            callback,
        });
        handle
    }

    fn cancel(&self, handle: TimerHandle) {
        self.lock().timers.retain(|t| t.handle != handle);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
