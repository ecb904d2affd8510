//! Timer engine: per-task interval accounting and the focus timer.
//!
//! The interval functions are pure over a `Task` and an explicit `now`; the
//! only wall-clock reads happen in the callers that own a `ServiceContext`.

mod driver;
mod pomodoro;

use chrono::{DateTime, TimeDelta, Utc};

use crate::model::{Status, Task};

pub use driver::{drive, Cadence, DriverSink};
pub use pomodoro::{
    Mode, Phase, PomodoroSession, PomodoroSnapshot, Preset, SessionEvent, MODE_SWITCH_DELAY,
    RESUME_WINDOW, SESSION_EXPIRY,
};

/// Age after which an open task interval is checkpointed on load.
pub const STALE_AFTER: TimeDelta = TimeDelta::hours(24);

/// Whole seconds in `delta`, clamped at zero.
pub(crate) fn whole_seconds(delta: TimeDelta) -> u64 {
    u64::try_from(delta.num_seconds()).unwrap_or(0)
}

/// Seconds accrued by `task` as of `now`, including any open interval.
///
/// Never negative: a `start_time` in the future contributes nothing.
#[must_use]
pub fn elapsed(task: &Task, now: DateTime<Utc>) -> u64 {
    match task.start_time {
        None => task.time_spent,
        Some(start) => task.time_spent.saturating_add(whole_seconds(now - start)),
    }
}

/// Opens a timer interval at `now`. Returns `false` if one was already open.
pub fn open_interval(task: &mut Task, now: DateTime<Utc>) -> bool {
    if task.start_time.is_some() {
        return false;
    }
    task.start_time = Some(now);
    true
}

/// Closes the open interval, folding its whole seconds into `time_spent`.
///
/// Returns the seconds flushed, or `None` if no interval was open.
pub fn close_interval(task: &mut Task, now: DateTime<Utc>) -> Option<u64> {
    let start = task.start_time.take()?;
    let flushed = whole_seconds(now - start);
    task.time_spent = task.time_spent.saturating_add(flushed);
    Some(flushed)
}

/// Flushes the open interval and immediately reopens it at `now`.
pub fn checkpoint(task: &mut Task, now: DateTime<Utc>) -> Option<u64> {
    let flushed = close_interval(task, now)?;
    task.start_time = Some(now);
    Some(flushed)
}

/// Renders seconds as `"{minutes}m {seconds}s"`; zero and negatives as `"0m 0s"`.
#[must_use]
pub fn format_duration(seconds: i64) -> String {
    if seconds <= 0 {
        return "0m 0s".to_string();
    }
    format!("{}m {}s", seconds / 60, seconds % 60)
}

/// Formats an unsigned second count.
#[must_use]
pub fn format_secs(seconds: u64) -> String {
    format_duration(i64::try_from(seconds).unwrap_or(i64::MAX))
}

/// One line of the live timer display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerReading {
    /// Task id.
    pub task_id: String,
    /// Seconds accrued so far.
    pub elapsed: u64,
    /// Formatted `elapsed`.
    pub display: String,
}

/// Computes the once-a-second display of every in-progress task.
///
/// Purely cosmetic: nothing here writes back to the tasks.
#[must_use]
pub fn refresh_readings(tasks: &[Task], now: DateTime<Utc>) -> Vec<TimerReading> {
    tasks
        .iter()
        .filter(|t| t.status == Status::InProgress)
        .map(|t| {
            let secs = elapsed(t, now);
            TimerReading { task_id: t.id.clone(), elapsed: secs, display: format_secs(secs) }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn t0() -> DateTime<Utc> {
        "2024-06-15T10:00:00Z".parse().unwrap()
    }

    fn task() -> Task {
        serde_json::from_str(r#"{"id":"t","title":"T"}"#).unwrap()
    }

    #[test]
    fn elapsed_without_open_interval_is_time_spent() {
        let mut t = task();
        t.time_spent = 90;
        assert_eq!(elapsed(&t, t0()), 90);
    }

    #[test]
    fn elapsed_adds_open_interval() {
        let mut t = task();
        t.time_spent = 10;
        t.start_time = Some(t0());
        assert_eq!(elapsed(&t, t0() + TimeDelta::milliseconds(61_900)), 71);
    }

    #[test]
    fn future_start_contributes_nothing() {
        let mut t = task();
        t.start_time = Some(t0() + TimeDelta::seconds(30));
        assert_eq!(elapsed(&t, t0()), 0);
    }

    #[test]
    fn open_is_noop_when_already_open() {
        let mut t = task();
        assert!(open_interval(&mut t, t0()));
        assert!(!open_interval(&mut t, t0() + TimeDelta::seconds(5)));
        assert_eq!(t.start_time, Some(t0()));
    }

    #[test]
    fn close_is_noop_when_already_closed() {
        let mut t = task();
        t.time_spent = 7;
        assert_eq!(close_interval(&mut t, t0()), None);
        assert_eq!(t.time_spent, 7);
    }

    #[test]
    fn checkpoint_keeps_interval_open() {
        let mut t = task();
        t.start_time = Some(t0());
        assert_eq!(checkpoint(&mut t, t0() + TimeDelta::seconds(40)), Some(40));
        assert_eq!(t.time_spent, 40);
        assert_eq!(t.start_time, Some(t0() + TimeDelta::seconds(40)));
    }

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_duration(0), "0m 0s");
        assert_eq!(format_duration(-5), "0m 0s");
        assert_eq!(format_duration(59), "0m 59s");
        assert_eq!(format_duration(125), "2m 5s");
        assert_eq!(format_duration(3600), "60m 0s");
    }

    #[test]
    fn readings_cover_only_in_progress_tasks() {
        let mut running = task();
        running.id = "run".into();
        running.status = Status::InProgress;
        running.start_time = Some(t0());
        let idle = task();

        let readings = refresh_readings(&[running, idle], t0() + TimeDelta::seconds(65));

        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].task_id, "run");
        assert_eq!(readings[0].display, "1m 5s");
    }

    proptest! {
        #[test]
        fn elapsed_is_monotonic(spent in 0u64..100_000, a in 0i64..200_000, b in 0i64..200_000) {
            let mut t = task();
            t.time_spent = spent;
            t.start_time = Some(t0());
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let early = elapsed(&t, t0() + TimeDelta::milliseconds(lo));
            let late = elapsed(&t, t0() + TimeDelta::milliseconds(hi));
            prop_assert!(early <= late);
            prop_assert!(early >= spent);
        }

        #[test]
        fn intervals_accumulate_without_loss(durations in proptest::collection::vec(0i64..10_000, 1..8)) {
            let mut t = task();
            let mut now = t0();
            for secs in &durations {
                open_interval(&mut t, now);
                now += TimeDelta::seconds(*secs);
                close_interval(&mut t, now);
                // idle gap between intervals must not count
                now += TimeDelta::seconds(17);
            }
            let expected: i64 = durations.iter().sum();
            prop_assert_eq!(t.time_spent, u64::try_from(expected).unwrap());
            prop_assert!(t.start_time.is_none());
        }
    }
}
