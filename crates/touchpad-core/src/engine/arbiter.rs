//! Ownership of the single pending delayed-click timer.
//!
//! A one-finger tap does not click right away.  The arbiter schedules a left
//! click `click_delay` in the future and remembers the timer.  Any later
//! event that disqualifies the tap (the finger travelled, a second finger
//! arrived, a two-finger tap won the race) cancels it.
//!
//! # Last-start-wins
//!
//! At most one timer is outstanding.  Scheduling a new click always cancels
//! the previous one first; clicks are never queued.
//!
//! # Cancellation vs. expiry
//!
//! The arbiter lives inside the engine's locked state, and the expiry
//! callback must take that same lock before clicking.  Each scheduled click
//! carries a token; on expiry the callback calls [`ClickArbiter::claim`],
//! which succeeds only if that token is still the pending one.  So once
//! [`ClickArbiter::cancel`] returns, the click either already fired or never
//! will, even if the timer thread was already waiting for the lock.

use std::time::Duration;

use tracing::debug;

use crate::scheduler::{Scheduler, TimerCallback, TimerHandle};

#[derive(Debug, Clone, Copy)]
struct PendingClick {
    handle: TimerHandle,
    token: u64,
}

/// Holds the one outstanding delayed-click timer, if any.
#[derive(Debug, Default)]
pub struct ClickArbiter {
    pending: Option<PendingClick>,
    next_token: u64,
}

impl ClickArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a delayed click is scheduled and not yet fired or cancelled.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Schedules a delayed click, superseding any earlier one.
    ///
    /// `on_expiry` builds the timer callback from the click's token; the
    /// callback must hand that token back to [`claim`](Self::claim).
    pub fn schedule(
        &mut self,
        scheduler: &dyn Scheduler,
        delay: Duration,
        on_expiry: impl FnOnce(u64) -> TimerCallback,
    ) {
        self.cancel(scheduler);

        self.next_token += 1;
        let token = self.next_token;
        let handle = scheduler.schedule(delay, on_expiry(token));
        self.pending = Some(PendingClick { handle, token });
        debug!(token, ?delay, "delayed click scheduled");
    }

    /// Cancels the pending click.  Returns `true` if one was pending.
    pub fn cancel(&mut self, scheduler: &dyn Scheduler) -> bool {
        match self.pending.take() {
            Some(pending) => {
                scheduler.cancel(pending.handle);
                debug!(token = pending.token, "pending click cancelled");
                true
            }
            None => false,
        }
    }

    /// Called by the expiry callback.  Returns `true` and clears the pending
    /// slot if `token` is still current; the caller then performs the click.
    pub fn claim(&mut self, token: u64) -> bool {
        match self.pending {
            Some(pending) if pending.token == token => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::manual::ManualScheduler;
    use std::sync::{Arc, Mutex};

    fn noop(_: u64) -> TimerCallback {
        Box::new(|| {})
    }

    #[test]
    fn test_schedule_marks_click_pending() {
        // Arrange
        let sched = ManualScheduler::new();
        let mut arbiter = ClickArbiter::new();

        // Act
        arbiter.schedule(&sched, Duration::from_millis(150), noop);

        // Assert
        assert!(arbiter.has_pending());
        assert_eq!(sched.pending(), 1);
    }

    #[test]
    fn test_second_schedule_supersedes_first() {
        let sched = ManualScheduler::new();
        let mut arbiter = ClickArbiter::new();

        arbiter.schedule(&sched, Duration::from_millis(150), noop);
        arbiter.schedule(&sched, Duration::from_millis(150), noop);

        // Only one timer survives in the scheduler.
        assert_eq!(sched.pending(), 1);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let sched = ManualScheduler::new();
        let mut arbiter = ClickArbiter::new();
        arbiter.schedule(&sched, Duration::from_millis(150), noop);

        assert!(arbiter.cancel(&sched));
        assert!(!arbiter.cancel(&sched));
        assert!(!arbiter.has_pending());
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn test_claim_succeeds_only_for_current_token() {
        // Arrange: capture the tokens handed to the callback builder
        let sched = ManualScheduler::new();
        let mut arbiter = ClickArbiter::new();
        let tokens = Arc::new(Mutex::new(Vec::new()));
        for _ in 0..2 {
            let t = Arc::clone(&tokens);
            arbiter.schedule(&sched, Duration::from_millis(150), move |token| {
                t.lock().unwrap().push(token);
                Box::new(|| {})
            });
        }
        let tokens = tokens.lock().unwrap().clone();

        // Act / Assert: the superseded token is stale, the newest one wins once
        assert!(!arbiter.claim(tokens[0]));
        assert!(arbiter.claim(tokens[1]));
        assert!(!arbiter.claim(tokens[1]));
        assert!(!arbiter.has_pending());
    }

    #[test]
    fn test_claim_after_cancel_fails() {
        let sched = ManualScheduler::new();
        let mut arbiter = ClickArbiter::new();
        let seen = Arc::new(Mutex::new(None));
        let s = Arc::clone(&seen);
        arbiter.schedule(&sched, Duration::from_millis(150), move |token| {
            *s.lock().unwrap() = Some(token);
            Box::new(|| {})
        });

        arbiter.cancel(&sched);

        let token = seen.lock().unwrap().unwrap();
        assert!(!arbiter.claim(token));
    }
}
