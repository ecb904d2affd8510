//! Command dispatch and handlers.

pub mod member;
pub mod pomodoro;
pub mod settings;
pub mod stats;
pub mod tasks;
pub mod transfer;
pub mod watch;

use crate::cli::{Cli, Command};
use crate::config::BoardConfig;
use crate::context::ServiceContext;
use crate::switcher::ContextSwitcher;

/// Dispatch a parsed command against the live store named by `config`.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(cli: &Cli, config: &BoardConfig) -> Result<(), String> {
    let ctx = ServiceContext::live(&config.store_dir);
    dispatch_with_context(&cli.command, cli.member.as_deref(), config, &ctx)
}

/// Dispatch a command with the given service context.
///
/// `member` plays the role of a member link: it overrides and replaces the
/// remembered active member before the command runs.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch_with_context(
    command: &Command,
    member: Option<&str>,
    config: &BoardConfig,
    ctx: &ServiceContext,
) -> Result<(), String> {
    let mut switcher = ContextSwitcher::open(ctx, member).map_err(|e| e.to_string())?;
    match command {
        Command::Add(args) => tasks::add(&switcher, config, args),
        Command::Edit(args) => tasks::edit(&switcher, config, args),
        Command::Move { id, status } => tasks::move_task(&switcher, config, id, *status),
        Command::Rm { id } => tasks::remove(&switcher, config, id),
        Command::Clear { yes } => tasks::clear(&switcher, config, *yes),
        Command::List(args) => tasks::list(ctx, &switcher, config, args),
        Command::Stats { json } => stats::run(ctx, &switcher, config, *json),
        Command::Export { output } => transfer::export(ctx, &switcher, config, output.as_deref()),
        Command::Import { path, yes } => transfer::import(&switcher, config, path, *yes),
        Command::Member(action) => member::run(&mut switcher, action),
        Command::Pomodoro(action) => pomodoro::run(ctx, action),
        Command::Settings { action } => settings::run(ctx, action.as_ref()),
        Command::Watch { ticks } => watch::run(ctx, &switcher, config, *ticks),
    }
}

/// Label for the active list in command output.
fn context_label(switcher: &ContextSwitcher<'_>) -> String {
    match switcher.active().member_id() {
        None => "default list".to_string(),
        Some(id) => switcher
            .members()
            .ok()
            .and_then(|roster| roster.get(id).map(|m| format!("{}'s list", m.name)))
            .unwrap_or_else(|| format!("member {id}")),
    }
}
