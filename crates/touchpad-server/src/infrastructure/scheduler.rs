//! Tokio-backed [`Scheduler`] for delayed clicks.
//!
//! Each scheduled callback is a Tokio task that sleeps for the delay and then
//! runs the callback, unless it was cancelled first.  Handles map to the
//! task's [`AbortHandle`] in a shared table:
//!
//! - `cancel` removes the table entry and aborts the task.
//! - The task removes its own entry after waking and only runs the callback
//!   if the entry was still there.
//!
//! Because both sides race for the same entry under one lock, exactly one of
//! "cancelled" and "fired" wins.  The table lock is never held while a
//! callback runs.
//!
//! The clock is Tokio's, so `#[tokio::test(start_paused = true)]` controls
//! both `now()` and the timers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tracing::trace;
use touchpad_core::{Scheduler, TimerCallback, TimerHandle};

type TaskTable = Arc<Mutex<HashMap<u64, AbortHandle>>>;

/// Runs timer callbacks on a Tokio runtime.
///
/// May be used from threads outside the runtime; tasks are spawned through
/// the stored [`Handle`].
pub struct TokioScheduler {
    runtime: Handle,
    next_id: AtomicU64,
    tasks: TaskTable,
}

impl TokioScheduler {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            next_id: AtomicU64::new(1),
            tasks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of timers scheduled and not yet fired or cancelled.
    pub fn pending(&self) -> usize {
        lock(&self.tasks).len()
    }
}

impl Scheduler for TokioScheduler {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let tasks = Arc::clone(&self.tasks);

        // Insert under the lock so the task cannot look up its entry first.
        let mut table = lock(&self.tasks);
        let task = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let claimed = lock(&tasks).remove(&id).is_some();
            if claimed {
                trace!(id, "timer fired");
                callback();
            }
        });
        table.insert(id, task.abort_handle());

        TimerHandle::from_raw(id)
    }

    fn cancel(&self, handle: TimerHandle) {
        let entry = lock(&self.tasks).remove(&handle.id());
        if let Some(task) = entry {
            task.abort();
            trace!(id = handle.id(), "timer cancelled");
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, task) in lock(&self.tasks).drain() {
            task.abort();
        }
    }
}

fn lock(tasks: &TaskTable) -> MutexGuard<'_, HashMap<u64, AbortHandle>> {
    tasks.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> TimerCallback) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let make = move || -> TimerCallback {
            let c = Arc::clone(&c);
            Box::new(move || {
                c.fetch_add(1, Ordering::SeqCst);
            })
        };
        (count, make)
    }

    #[tokio::test(start_paused = true)]
    async fn test_callback_fires_after_delay() {
        // Arrange
        let sched = TokioScheduler::new(Handle::current());
        let (count, make) = counter();

        // Act
        sched.schedule(Duration::from_millis(150), make());
        tokio::time::sleep(Duration::from_millis(149)).await;
        let before = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(2)).await;

        // Assert
        assert_eq!(before, 0);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(sched.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_callback_never_fires() {
        let sched = TokioScheduler::new(Handle::current());
        let (count, make) = counter();

        let handle = sched.schedule(Duration::from_millis(150), make());
        tokio::time::sleep(Duration::from_millis(100)).await;
        sched.cancel(handle);
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(sched.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_after_fire_is_noop() {
        let sched = TokioScheduler::new(Handle::current());
        let (count, make) = counter();

        let handle = sched.schedule(Duration::from_millis(10), make());
        tokio::time::sleep(Duration::from_millis(20)).await;
        sched.cancel(handle);

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_now_follows_paused_clock() {
        let sched = TokioScheduler::new(Handle::current());
        let start = sched.now();

        tokio::time::advance(Duration::from_millis(300)).await;

        assert!(sched.now() - start >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_handles_are_unique() {
        let sched = TokioScheduler::new(Handle::current());
        let (_count, make) = counter();

        let a = sched.schedule(Duration::from_secs(1), make());
        let b = sched.schedule(Duration::from_secs(1), make());

        assert_ne!(a, b);
        assert_eq!(sched.pending(), 2);
    }
}
