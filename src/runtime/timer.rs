//! Owned handles to spawned background tasks.

use tokio::task::AbortHandle;
use tokio::time::{self, Duration, Instant, MissedTickBehavior};

/// Aborts the task when dropped.
#[derive(Debug)]
pub struct TaskGuard(AbortHandle);

impl TaskGuard {
    /// Guard a spawned task.
    pub fn new(handle: AbortHandle) -> Self {
        Self(handle)
    }

    /// Whether the task has completed or been aborted.
    pub fn is_finished(&self) -> bool {
        self.0.is_finished()
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// The recurring pull timer.
///
/// Fires `on_tick` every `period`, first after one full period. Ticks the
/// consumer fell behind on are delayed rather than bursted. Dropping the
/// handle stops the timer.
#[derive(Debug)]
pub struct TimerHandle {
    period: Duration,
    _task: TaskGuard,
}

impl TimerHandle {
    /// Start the timer on the current `LocalSet`.
    ///
    /// # Panics
    ///
    /// Panics if called outside a `LocalSet` context.
    pub fn start<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> bool + 'static,
    {
        let task = tokio::task::spawn_local(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if !on_tick() {
                    break;
                }
            }
        });
        Self {
            period,
            _task: TaskGuard::new(task.abort_handle()),
        }
    }

    /// Tick period.
    pub fn period(&self) -> Duration {
        self.period
    }
}
