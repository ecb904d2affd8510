//! `taskboard watch` command: live task timers and the focus countdown.

use super::pomodoro::{describe, load_session, print_event, save_session};
use crate::config::BoardConfig;
use crate::context::ServiceContext;
use crate::model::Task;
use crate::switcher::ContextSwitcher;
use crate::timer::{self, drive, Cadence, DriverSink, PomodoroSession};

/// Sink printing timer readings and advancing the focus session.
struct WatchSink<'a> {
    ctx: &'a ServiceContext,
    tasks: Vec<Task>,
    session: PomodoroSession,
}

impl DriverSink for WatchSink<'_> {
    fn task_tick(&mut self) {
        let now = self.ctx.clock.now();
        let readings = timer::refresh_readings(&self.tasks, now);
        let line: Vec<String> = readings.iter().map(|r| format!("{} {}", r.task_id, r.display)).collect();
        if line.is_empty() {
            println!("[{}] {}", now.format("%H:%M:%S"), describe(&self.session));
        } else {
            println!("[{}] {} | {}", now.format("%H:%M:%S"), line.join("  "), describe(&self.session));
        }
    }

    fn pomodoro_tick(&mut self) {
        if let Some(event) = self.session.tick(self.ctx.clock.now()) {
            print_event(&event);
            if let Err(err) = save_session(self.ctx, &self.session) {
                tracing::warn!(error = %err, "failed to save focus session");
            }
        }
    }
}

/// Execute the `watch` command.
///
/// Runs on a single-threaded runtime until Ctrl-C or `ticks` refreshes,
/// then saves the focus session.
///
/// # Errors
///
/// Returns an error string if the list or session cannot be loaded, the
/// runtime cannot start, or the session cannot be saved.
pub fn run(
    ctx: &ServiceContext,
    switcher: &ContextSwitcher<'_>,
    config: &BoardConfig,
    ticks: Option<u64>,
) -> Result<(), String> {
    let store = switcher.task_store_with(config.stale_after).map_err(|e| e.to_string())?;
    let mut sink = WatchSink { ctx, tasks: store.tasks().to_vec(), session: load_session(ctx)? };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start runtime: {e}"))?;
    let fired = runtime.block_on(async {
        let shutdown = async {
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        };
        drive(Cadence::default(), ticks, &mut sink, shutdown).await
    });
    tracing::debug!(fired, "watch stopped");
    save_session(ctx, &sink.session)
}
