//! `taskboard stats` command.

use super::context_label;
use crate::board::BoardStats;
use crate::config::BoardConfig;
use crate::context::ServiceContext;
use crate::storage::StorageGateway;
use crate::switcher::ContextSwitcher;

/// Execute the `stats` command.
///
/// Honors the `showStats` preference: when it is off only a hint is printed.
/// With `json` the numbers are printed as one JSON object instead.
///
/// # Errors
///
/// Returns an error string if the list or settings cannot be loaded.
pub fn run(
    ctx: &ServiceContext,
    switcher: &ContextSwitcher<'_>,
    config: &BoardConfig,
    json: bool,
) -> Result<(), String> {
    let settings = StorageGateway::new(ctx).load_settings().map_err(|e| e.to_string())?;
    if !settings.show_stats && !json {
        println!("Statistics are hidden; enable with `taskboard settings set show-stats true`.");
        return Ok(());
    }
    let store = switcher.task_store_with(config.stale_after).map_err(|e| e.to_string())?;
    let stats = BoardStats::compute(store.tasks(), ctx.clock.now().date_naive());
    if json {
        let text = serde_json::to_string_pretty(&stats).map_err(|e| e.to_string())?;
        println!("{text}");
        return Ok(());
    }

    println!("Statistics for the {}", context_label(switcher));
    println!("  Total:           {}", stats.total);
    println!("  To do:           {}", stats.columns.todo);
    println!("  In progress:     {}", stats.columns.in_progress);
    println!("  Done:            {}", stats.columns.done);
    println!("  Completion:      {}%", stats.completion_rate);
    println!("  Overdue:         {}", stats.overdue);
    println!("  Due today:       {}", stats.due_today);
    println!("  Due this week:   {}", stats.due_this_week);
    println!(
        "  Priorities:      high {} / medium {} / low {}",
        stats.priorities.high, stats.priorities.medium, stats.priorities.low
    );
    Ok(())
}
