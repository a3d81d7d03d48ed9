//! Per-command countdowns.
//!
//! Each armed timer is a spawned tokio task that sleeps for the command
//! timeout and then runs its expiry callback. Disarming aborts the task; it is
//! a no-op once the timer has fired or was already disarmed.

use super::registry::CorrelationId;
use std::time::Duration;
use tokio::task::AbortHandle;
use tracing::trace;

/// Handle to an armed countdown.
#[derive(Debug)]
pub struct TimerHandle {
    abort: AbortHandle,
}

impl TimerHandle {
    /// Cancel the countdown.
    pub fn disarm(self) {
        self.abort.abort();
    }

    /// Whether the countdown task has finished (fired or cancelled).
    pub fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }
}

/// Arms cancellable countdowns on the current tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeoutScheduler;

impl TimeoutScheduler {
    pub fn new() -> Self {
        Self
    }

    /// Start a countdown for `id`, invoking `on_expire` when it elapses.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm<F>(&self, id: &CorrelationId, duration: Duration, on_expire: F) -> TimerHandle
    where
        F: FnOnce() + Send + 'static,
    {
        let id = id.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            trace!("Timer expired for {}", id);
            on_expire();
        });

        TimerHandle {
            abort: task.abort_handle(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_timer_fires_after_duration() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        let id = CorrelationId::new("t", 1);

        let handle = TimeoutScheduler::new().arm(&id, Duration::from_secs(3), move || {
            flag.store(true, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(2900)).await;
        assert!(!fired.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(fired.load(Ordering::SeqCst));
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarmed_timer_never_fires() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        let id = CorrelationId::new("t", 2);

        let handle = TimeoutScheduler::new().arm(&id, Duration::from_secs(1), move || {
            flag.store(true, Ordering::SeqCst);
        });
        handle.disarm();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarm_after_fire_is_noop() {
        let id = CorrelationId::new("t", 3);
        let handle = TimeoutScheduler::new().arm(&id, Duration::from_millis(10), || {});

        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.disarm();
    }
}
