//! Owned, cancellable periodic task.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Shortest period a task will run at; zero is raised to this.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// A spawned loop that runs `tick` on a fixed period until cancelled.
///
/// Ticks never overlap: the next one is only scheduled after the previous
/// `tick` future has completed. Cancelling lets an in-flight tick finish,
/// after which the loop exits without scheduling again. Dropping the
/// handle cancels the task as well.
#[derive(Debug)]
pub struct PeriodicTask {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl PeriodicTask {
    /// Spawn onto the current Tokio runtime, first firing at `start`.
    ///
    /// A `period` below [`MIN_PERIOD`] is clamped to it. Panics when called
    /// outside a runtime.
    pub fn spawn<F, Fut>(start: Instant, period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let period = period.max(MIN_PERIOD);
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(start, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    // Fires on cancel, and with Err once the sender is dropped.
                    _ = shutdown_rx.changed() => break,
                    _ = interval.tick() => tick().await,
                }
            }
        });

        Self { shutdown, handle }
    }

    /// Fire immediately, then every `period`.
    pub fn spawn_now<F, Fut>(period: Duration, tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::spawn(Instant::now(), period, tick)
    }

    /// First fire one `period` from now.
    pub fn spawn_delayed<F, Fut>(period: Duration, tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let period = period.max(MIN_PERIOD);
        Self::spawn(Instant::now() + period, period, tick)
    }

    /// Stop scheduling further ticks.
    pub fn cancel(self) {
        self.signal_shutdown();
    }

    /// Like [`cancel`](Self::cancel), but keeps the handle so the caller
    /// can observe the loop exit.
    pub fn signal_shutdown(&self) {
        // Err only means the loop already exited.
        let _ = self.shutdown.send(true);
    }

    /// True once the loop has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
