//! The session clock.
//!
//! A periodic callback on its own tokio task. The first tick fires one full
//! period after `start`, like a browser interval timer. The returned
//! [`ClockHandle`] owns the timer: stopping it, or dropping it, ends the task.
//!
//! The stop check and the callback run under one lock that `stop` also
//! takes, so once `stop` returns no callback is running or will run.

use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Default tick period.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

/// Produces one tick per period until stopped.
#[derive(Debug, Clone, Copy)]
pub struct SessionClock {
    period: Duration,
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_PERIOD)
    }
}

impl SessionClock {
    /// A zero period is bumped to one millisecond.
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Start ticking. `on_tick` returning `Break` stops the clock from the
    /// inside (e.g. once the countdown has run out).
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<F>(&self, mut on_tick: F) -> ClockHandle
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let stopped = Arc::new(Mutex::new(false));
        let gate = Arc::clone(&stopped);
        let period = self.period;

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut ticks = 0u64;

            loop {
                tokio::select! {
                    biased;
                    () = cancelled.cancelled() => break,
                    _ = interval.tick() => {
                        let halted = gate.lock().unwrap_or_else(PoisonError::into_inner);
                        if *halted {
                            break;
                        }
                        ticks += 1;
                        if on_tick().is_break() {
                            break;
                        }
                    }
                }
            }

            // Mark the handle stopped on natural expiry too.
            cancelled.cancel();
            tracing::trace!(ticks, "session clock stopped");
        });

        ClockHandle {
            token,
            stopped,
            task: Some(task),
        }
    }
}

/// Ownership of a running clock. Dropping the handle stops the clock.
#[derive(Debug)]
pub struct ClockHandle {
    token: CancellationToken,
    stopped: Arc<Mutex<bool>>,
    task: Option<JoinHandle<()>>,
}

impl ClockHandle {
    /// Stop the clock. Safe to call any number of times, including after
    /// the clock ended on its own.
    ///
    /// Blocks while a callback is in flight. After it returns `on_tick`
    /// never runs again, even on a multi-threaded runtime. Must not be
    /// called from inside `on_tick`.
    pub fn stop(&self) {
        *self.stopped.lock().unwrap_or_else(PoisonError::into_inner) = true;
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Stop the clock and wait for its task to exit. After this returns the
    /// callback is guaranteed not to run again.
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!("session clock task failed: {e}");
            }
        }
    }
}

impl Drop for ClockHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
