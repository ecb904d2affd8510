//! Focus (Pomodoro) timer state machine.
//!
//! ```text
//! idle --select_preset--> running --pause--> paused --start--> running
//! running --countdown hits 0--> transition --MODE_SWITCH_DELAY--> running (mode flipped)
//! any --stop--> idle
//! any --reset--> same phase, full duration of the current mode
//! ```
//!
//! Remaining time is always recomputed from the wall clock anchor taken when
//! the countdown (re)started, never by decrementing, so a late or skipped
//! tick self-corrects.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::whole_seconds;
use crate::error::BoardError;

/// Pause between a countdown reaching zero and the next mode starting.
pub const MODE_SWITCH_DELAY: TimeDelta = TimeDelta::seconds(2);

/// A running session saved less than this long ago resumes on load.
pub const RESUME_WINDOW: TimeDelta = TimeDelta::seconds(60);

/// A session saved longer ago than this is discarded on load.
pub const SESSION_EXPIRY: TimeDelta = TimeDelta::hours(24);

/// Named (work, break) duration pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// 25 minutes of work, 5 minutes of break.
    Short,
    /// 45 minutes of work, 10 minutes of break.
    Long,
}

impl Preset {
    /// `(work, break)` durations in seconds.
    #[must_use]
    pub fn durations(self) -> (u64, u64) {
        match self {
            Preset::Short => (25 * 60, 5 * 60),
            Preset::Long => (45 * 60, 10 * 60),
        }
    }

    /// Duration of `mode` in seconds.
    #[must_use]
    pub fn duration(self, mode: Mode) -> u64 {
        let (work, rest) = self.durations();
        match mode {
            Mode::Work => work,
            Mode::Break => rest,
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Preset::Short => "short",
            Preset::Long => "long",
        })
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short" => Ok(Preset::Short),
            "long" => Ok(Preset::Long),
            other => Err(format!("unknown preset '{other}' (expected short or long)")),
        }
    }
}

/// What the countdown is timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Focus period.
    #[default]
    Work,
    /// Rest period.
    Break,
}

impl Mode {
    /// The other mode.
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Mode::Work => Mode::Break,
            Mode::Break => Mode::Work,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Work => "work",
            Mode::Break => "break",
        })
    }
}

/// Lifecycle state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No preset chosen.
    Idle,
    /// Counting down.
    Running,
    /// Holding the remaining time.
    Paused,
    /// Countdown finished; waiting out `MODE_SWITCH_DELAY` before flipping.
    Transition,
}

/// Notable state changes reported by `tick`, for toasts and notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The countdown for `mode` reached zero.
    Completed {
        /// Mode that just finished.
        mode: Mode,
    },
    /// A new countdown started in `mode`.
    Switched {
        /// Mode now running.
        mode: Mode,
        /// Its full duration in seconds.
        duration: u64,
    },
}

/// Persisted form of the session under the `pomodoroTimer` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PomodoroSnapshot {
    /// Chosen preset, `None` when idle.
    pub preset: Option<Preset>,
    /// Current mode.
    pub mode: Mode,
    /// Seconds left when the snapshot was taken.
    pub time_remaining: u64,
    /// Full duration of the current mode.
    pub total_time: u64,
    /// Counting down (or between modes) when saved.
    #[serde(alias = "running")]
    pub is_running: bool,
    /// Paused when saved.
    #[serde(alias = "paused")]
    pub is_paused: bool,
    /// Wall clock of the save, epoch milliseconds.
    pub timestamp: i64,
}

impl Default for PomodoroSnapshot {
    fn default() -> Self {
        Self {
            preset: None,
            mode: Mode::Work,
            time_remaining: 0,
            total_time: 0,
            is_running: false,
            is_paused: false,
            timestamp: 0,
        }
    }
}

/// The focus timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PomodoroSession {
    preset: Option<Preset>,
    mode: Mode,
    time_remaining: u64,
    total_time: u64,
    phase: Phase,
    // Wall clock instant the current countdown started and the seconds it
    // had left at that instant.
    anchor: Option<(DateTime<Utc>, u64)>,
    switch_due: Option<DateTime<Utc>>,
}

impl Default for PomodoroSession {
    fn default() -> Self {
        Self::new()
    }
}

impl PomodoroSession {
    /// An idle session with no preset.
    #[must_use]
    pub fn new() -> Self {
        Self {
            preset: None,
            mode: Mode::Work,
            time_remaining: 0,
            total_time: 0,
            phase: Phase::Idle,
            anchor: None,
            switch_due: None,
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Chosen preset.
    #[must_use]
    pub fn preset(&self) -> Option<Preset> {
        self.preset
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Seconds left as of the last tick or state change.
    #[must_use]
    pub fn time_remaining(&self) -> u64 {
        self.time_remaining
    }

    /// Full duration of the current mode.
    #[must_use]
    pub fn total_time(&self) -> u64 {
        self.total_time
    }

    /// Whether the countdown is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Running | Phase::Transition)
    }

    /// Whether the countdown is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.phase == Phase::Paused
    }

    /// Fraction of the current mode already elapsed, in `0.0..=1.0`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self) -> f64 {
        if self.total_time == 0 {
            return 0.0;
        }
        let done = self.total_time.saturating_sub(self.time_remaining);
        (done as f64 / self.total_time as f64).clamp(0.0, 1.0)
    }

    /// Chooses a preset and starts a work countdown immediately.
    pub fn select_preset(&mut self, preset: Preset, now: DateTime<Utc>) {
        self.preset = Some(preset);
        self.begin(Mode::Work, now);
    }

    /// Starts or resumes the countdown with the time that was left.
    ///
    /// Starting an already-running session is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::NoPreset` when no preset has been chosen.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), BoardError> {
        if self.preset.is_none() {
            return Err(BoardError::NoPreset);
        }
        match self.phase {
            Phase::Running | Phase::Transition => {}
            Phase::Idle | Phase::Paused if self.time_remaining == 0 => {
                self.enter_transition(now);
            }
            Phase::Idle | Phase::Paused => {
                self.phase = Phase::Running;
                self.anchor = Some((now, self.time_remaining));
            }
        }
        Ok(())
    }

    /// Pauses a running countdown. Returns `false` if it was not running.
    pub fn pause(&mut self, now: DateTime<Utc>) -> bool {
        if self.phase != Phase::Running {
            return false;
        }
        self.time_remaining = self.remaining_at(now);
        self.phase = Phase::Paused;
        self.anchor = None;
        true
    }

    /// Reloads the full duration of the current mode, keeping the phase.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        let Some(preset) = self.preset else {
            return;
        };
        self.total_time = preset.duration(self.mode);
        self.time_remaining = self.total_time;
        self.switch_due = None;
        match self.phase {
            Phase::Running | Phase::Transition => {
                self.phase = Phase::Running;
                self.anchor = Some((now, self.time_remaining));
            }
            Phase::Paused | Phase::Idle => {}
        }
    }

    /// Returns to idle, forgetting the preset. Pending mode switches are dropped.
    pub fn stop(&mut self) {
        *self = Self::new();
    }

    /// Advances the countdown to `now`.
    ///
    /// Driven by the periodic tick; idle and paused sessions ignore it.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<SessionEvent> {
        match self.phase {
            Phase::Running => {
                self.time_remaining = self.remaining_at(now);
                if self.time_remaining > 0 {
                    return None;
                }
                let mode = self.mode;
                self.enter_transition(now + MODE_SWITCH_DELAY);
                tracing::info!(%mode, "focus countdown finished");
                Some(SessionEvent::Completed { mode })
            }
            Phase::Transition => {
                let due = self.switch_due?;
                if now < due || self.preset.is_none() {
                    return None;
                }
                let next = self.mode.flipped();
                self.begin(next, now);
                tracing::info!(mode = %next, duration = self.total_time, "focus timer switched mode");
                Some(SessionEvent::Switched { mode: next, duration: self.total_time })
            }
            Phase::Idle | Phase::Paused => None,
        }
    }

    /// Captures the session for persistence.
    #[must_use]
    pub fn snapshot(&self, now: DateTime<Utc>) -> PomodoroSnapshot {
        let time_remaining = match self.phase {
            Phase::Running => self.remaining_at(now),
            _ => self.time_remaining,
        };
        PomodoroSnapshot {
            preset: self.preset,
            mode: self.mode,
            time_remaining,
            total_time: self.total_time,
            is_running: self.is_running(),
            is_paused: self.is_paused(),
            timestamp: now.timestamp_millis(),
        }
    }

    /// Rebuilds a session from a snapshot saved at `snapshot.timestamp`.
    ///
    /// A running session saved within `RESUME_WINDOW` resumes with the time
    /// elapsed since the save subtracted. Anything saved more than
    /// `SESSION_EXPIRY` ago comes back idle. Otherwise the preset and mode are
    /// restored paused.
    #[must_use]
    pub fn restore(snapshot: &PomodoroSnapshot, now: DateTime<Utc>) -> Self {
        let age = TimeDelta::milliseconds((now.timestamp_millis() - snapshot.timestamp).max(0));
        let Some(preset) = snapshot.preset else {
            return Self::new();
        };
        if age > SESSION_EXPIRY {
            tracing::debug!(age_secs = age.num_seconds(), "discarding expired focus session");
            return Self::new();
        }

        let full = preset.duration(snapshot.mode);
        let mut session = Self {
            preset: Some(preset),
            mode: snapshot.mode,
            time_remaining: 0,
            total_time: full,
            phase: Phase::Paused,
            anchor: None,
            switch_due: None,
        };

        if snapshot.is_running && age < RESUME_WINDOW {
            if snapshot.total_time > 0 {
                session.total_time = snapshot.total_time;
            }
            session.time_remaining = snapshot.time_remaining.saturating_sub(whole_seconds(age));
            if session.time_remaining == 0 {
                session.enter_transition(now);
            } else {
                session.phase = Phase::Running;
                session.anchor = Some((now, session.time_remaining));
            }
        } else {
            session.time_remaining =
                if snapshot.time_remaining > 0 { snapshot.time_remaining } else { full };
        }
        session
    }

    fn begin(&mut self, mode: Mode, now: DateTime<Utc>) {
        let full = self.preset.map_or(0, |p| p.duration(mode));
        self.mode = mode;
        self.total_time = full;
        self.time_remaining = full;
        self.phase = Phase::Running;
        self.anchor = Some((now, full));
        self.switch_due = None;
    }

    fn enter_transition(&mut self, due: DateTime<Utc>) {
        self.time_remaining = 0;
        self.phase = Phase::Transition;
        self.anchor = None;
        self.switch_due = Some(due);
    }

    fn remaining_at(&self, now: DateTime<Utc>) -> u64 {
        match self.anchor {
            Some((started, initial)) => initial.saturating_sub(whole_seconds(now - started)),
            None => self.time_remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        "2024-06-15T09:00:00Z".parse().unwrap()
    }

    fn at(secs: i64) -> DateTime<Utc> {
        t0() + TimeDelta::seconds(secs)
    }

    #[test]
    fn selecting_a_preset_starts_work() {
        let mut s = PomodoroSession::new();
        s.select_preset(Preset::Short, t0());
        assert_eq!(s.phase(), Phase::Running);
        assert_eq!(s.mode(), Mode::Work);
        assert_eq!(s.time_remaining(), 1500);
        assert_eq!(s.total_time(), 1500);
    }

    #[test]
    fn start_without_preset_is_rejected() {
        let mut s = PomodoroSession::new();
        assert!(matches!(s.start(t0()), Err(BoardError::NoPreset)));
        assert_eq!(s.phase(), Phase::Idle);
    }

    #[test]
    fn countdown_uses_wall_clock_not_tick_count() {
        let mut s = PomodoroSession::new();
        s.select_preset(Preset::Short, t0());
        // a single late tick lands on the right value
        assert_eq!(s.tick(at(600)), None);
        assert_eq!(s.time_remaining(), 900);
        assert_eq!(s.tick(at(600) + TimeDelta::milliseconds(900)), None);
        assert_eq!(s.time_remaining(), 900);
    }

    #[test]
    fn work_rolls_into_break_without_input() {
        let mut s = PomodoroSession::new();
        s.select_preset(Preset::Short, t0());

        assert_eq!(s.tick(at(1500)), Some(SessionEvent::Completed { mode: Mode::Work }));
        assert_eq!(s.phase(), Phase::Transition);
        assert_eq!(s.tick(at(1501)), None);
        assert_eq!(
            s.tick(at(1502)),
            Some(SessionEvent::Switched { mode: Mode::Break, duration: 300 })
        );
        assert_eq!(s.phase(), Phase::Running);
        assert_eq!(s.mode(), Mode::Break);
        assert_eq!(s.time_remaining(), 300);

        assert_eq!(s.tick(at(1802)), Some(SessionEvent::Completed { mode: Mode::Break }));
        assert_eq!(
            s.tick(at(1804)),
            Some(SessionEvent::Switched { mode: Mode::Work, duration: 1500 })
        );
    }

    #[test]
    fn pause_holds_remaining_and_start_resumes_it() {
        let mut s = PomodoroSession::new();
        s.select_preset(Preset::Long, t0());
        assert!(s.pause(at(100)));
        assert_eq!(s.time_remaining(), 2600);
        assert_eq!(s.tick(at(5000)), None);
        assert_eq!(s.time_remaining(), 2600);

        s.start(at(5000)).unwrap();
        s.tick(at(5060));
        assert_eq!(s.time_remaining(), 2540);
        assert!(!s.is_paused());
    }

    #[test]
    fn reset_keeps_phase() {
        let mut s = PomodoroSession::new();
        s.select_preset(Preset::Short, t0());
        s.pause(at(200));
        s.reset(at(300));
        assert_eq!(s.phase(), Phase::Paused);
        assert_eq!(s.time_remaining(), 1500);

        s.start(at(400)).unwrap();
        s.tick(at(500));
        s.reset(at(500));
        assert_eq!(s.phase(), Phase::Running);
        s.tick(at(510));
        assert_eq!(s.time_remaining(), 1490);
    }

    #[test]
    fn stop_cancels_pending_switch() {
        let mut s = PomodoroSession::new();
        s.select_preset(Preset::Short, t0());
        s.tick(at(1500));
        s.stop();
        assert_eq!(s.tick(at(1502)), None);
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.preset(), None);
        assert_eq!(s.time_remaining(), 0);
    }

    #[test]
    fn recent_running_snapshot_resumes_with_elapsed_subtracted() {
        let mut s = PomodoroSession::new();
        s.select_preset(Preset::Short, t0());
        let snap = s.snapshot(at(100));
        assert_eq!(snap.time_remaining, 1400);

        let restored = PomodoroSession::restore(&snap, at(130));
        assert_eq!(restored.phase(), Phase::Running);
        assert_eq!(restored.time_remaining(), 1370);
    }

    #[test]
    fn older_running_snapshot_restores_paused() {
        let mut s = PomodoroSession::new();
        s.select_preset(Preset::Short, t0());
        let snap = s.snapshot(at(100));

        let restored = PomodoroSession::restore(&snap, at(100 + 3600));
        assert_eq!(restored.phase(), Phase::Paused);
        assert_eq!(restored.preset(), Some(Preset::Short));
        assert_eq!(restored.time_remaining(), 1400);
    }

    #[test]
    fn expired_snapshot_restores_idle() {
        let mut s = PomodoroSession::new();
        s.select_preset(Preset::Short, t0());
        let snap = s.snapshot(t0());
        let restored = PomodoroSession::restore(&snap, t0() + TimeDelta::hours(25));
        assert_eq!(restored.phase(), Phase::Idle);
    }

    #[test]
    fn snapshot_that_ran_out_switches_on_next_tick() {
        let snap = PomodoroSnapshot {
            preset: Some(Preset::Short),
            mode: Mode::Work,
            time_remaining: 10,
            total_time: 1500,
            is_running: true,
            is_paused: false,
            timestamp: t0().timestamp_millis(),
        };
        let mut restored = PomodoroSession::restore(&snap, at(30));
        assert_eq!(restored.phase(), Phase::Transition);
        assert_eq!(
            restored.tick(at(30)),
            Some(SessionEvent::Switched { mode: Mode::Break, duration: 300 })
        );
    }

    #[test]
    fn snapshot_accepts_short_flag_names() {
        let snap: PomodoroSnapshot = serde_json::from_str(
            r#"{"preset":"long","mode":"break","timeRemaining":12,"totalTime":600,"running":false,"paused":true,"timestamp":0}"#,
        )
        .unwrap();
        assert!(snap.is_paused);
        assert_eq!(snap.mode, Mode::Break);
    }

    #[test]
    fn progress_tracks_elapsed_fraction() {
        let mut s = PomodoroSession::new();
        assert!(s.progress().abs() < f64::EPSILON);
        s.select_preset(Preset::Short, t0());
        s.tick(at(750));
        assert!((s.progress() - 0.5).abs() < 1e-9);
    }
}
