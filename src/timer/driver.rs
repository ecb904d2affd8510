//! Periodic driver for the timer displays.
//!
//! Two independent cadences share one single-threaded event loop: a slow one
//! for task timer displays and a fast one for the focus countdown. Neither
//! callback may block; each runs to completion before the next fires.

use std::future::Future;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};

/// Tick intervals for the two drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    /// Task timer display refresh.
    pub task_refresh: Duration,
    /// Focus countdown refresh.
    pub pomodoro_tick: Duration,
}

impl Default for Cadence {
    fn default() -> Self {
        Self { task_refresh: Duration::from_secs(1), pomodoro_tick: Duration::from_millis(100) }
    }
}

/// Receives ticks from `drive`.
pub trait DriverSink {
    /// Called on every task refresh tick.
    fn task_tick(&mut self);

    /// Called on every focus countdown tick.
    fn pomodoro_tick(&mut self);
}

/// Runs both drivers until `shutdown` resolves or `limit` task ticks fired.
///
/// Missed ticks are skipped rather than replayed in a burst; the sinks
/// recompute from the wall clock, so skipping loses nothing.
pub async fn drive<S, F>(cadence: Cadence, limit: Option<u64>, sink: &mut S, shutdown: F) -> u64
where
    S: DriverSink,
    F: Future<Output = ()>,
{
    let mut tasks = interval(cadence.task_refresh);
    tasks.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut pomodoro = interval(cadence.pomodoro_tick);
    pomodoro.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    let mut fired = 0u64;
    loop {
        tokio::select! {
            () = &mut shutdown => break,
            _ = tasks.tick() => {
                sink.task_tick();
                fired += 1;
                if limit.is_some_and(|max| fired >= max) {
                    break;
                }
            }
            _ = pomodoro.tick() => sink.pomodoro_tick(),
        }
    }
    fired
}
