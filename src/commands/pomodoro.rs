//! `taskboard pomodoro` commands.

use crate::cli::PomodoroCommand;
use crate::context::ServiceContext;
use crate::storage::StorageGateway;
use crate::timer::{self, Phase, PomodoroSession, SessionEvent};

/// Restore the persisted session as of now, catching up on elapsed time.
pub(crate) fn load_session(ctx: &ServiceContext) -> Result<PomodoroSession, String> {
    let now = ctx.clock.now();
    let snapshot = StorageGateway::new(ctx).load_pomodoro().map_err(|e| e.to_string())?;
    let mut session = snapshot.map_or_else(PomodoroSession::new, |s| PomodoroSession::restore(&s, now));
    if let Some(event) = session.tick(now) {
        print_event(&event);
    }
    Ok(session)
}

pub(crate) fn save_session(ctx: &ServiceContext, session: &PomodoroSession) -> Result<(), String> {
    StorageGateway::new(ctx).save_pomodoro(&session.snapshot(ctx.clock.now())).map_err(|e| e.to_string())
}

pub(crate) fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::Completed { mode } => println!("{mode} session complete!"),
        SessionEvent::Switched { mode, duration } => {
            println!("Starting {mode} ({})", timer::format_secs(*duration));
        }
    }
}

pub(crate) fn describe(session: &PomodoroSession) -> String {
    let Some(preset) = session.preset() else {
        return "Focus timer idle; start one with `taskboard pomodoro start short|long`.".to_string();
    };
    let state = match session.phase() {
        Phase::Idle => "idle",
        Phase::Running => "running",
        Phase::Paused => "paused",
        Phase::Transition => "switching",
    };
    format!(
        "{preset} preset, {} {state}: {} left of {} ({:.0}%)",
        session.mode(),
        timer::format_secs(session.time_remaining()),
        timer::format_secs(session.total_time()),
        session.progress() * 100.0
    )
}

/// Execute a `pomodoro` subcommand and persist the session.
///
/// # Errors
///
/// Returns an error string when starting without a preset, or if the
/// session cannot be loaded or saved.
pub fn run(ctx: &ServiceContext, action: &PomodoroCommand) -> Result<(), String> {
    let mut session = load_session(ctx)?;
    let now = ctx.clock.now();
    match action {
        PomodoroCommand::Start { preset: Some(preset) } => session.select_preset(*preset, now),
        PomodoroCommand::Start { preset: None } => session.start(now).map_err(|e| e.to_string())?,
        PomodoroCommand::Pause => {
            if !session.pause(now) {
                println!("Focus timer is not running.");
            }
        }
        PomodoroCommand::Reset => session.reset(now),
        PomodoroCommand::Stop => session.stop(),
        PomodoroCommand::Status => {}
    }
    println!("{}", describe(&session));
    save_session(ctx, &session)
}
