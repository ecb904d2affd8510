//! Task commands: `add`, `edit`, `move`, `rm`, `clear`, `list`.

use chrono::{DateTime, Utc};

use super::context_label;
use crate::board::{ColumnCounts, TaskStore};
use crate::cli::{AddArgs, EditArgs, ListArgs};
use crate::config::BoardConfig;
use crate::context::ServiceContext;
use crate::model::{NewTask, Status, Tags, Task, TaskPatch};
use crate::projector::{project, Filter};
use crate::switcher::ContextSwitcher;
use crate::timer;

fn open_store<'a>(switcher: &ContextSwitcher<'a>, config: &BoardConfig) -> Result<TaskStore<'a>, String> {
    switcher.task_store_with(config.stale_after).map_err(|e| e.to_string())
}

fn tags_of(raw: &[String]) -> Tags {
    raw.iter().map(String::as_str).collect()
}

/// Execute the `add` command.
///
/// # Errors
///
/// Returns an error string if the title is blank or the write fails.
pub fn add(switcher: &ContextSwitcher<'_>, config: &BoardConfig, args: &AddArgs) -> Result<(), String> {
    let mut store = open_store(switcher, config)?;
    let task = store
        .create(NewTask {
            title: args.title.clone(),
            description: args.description.clone(),
            priority: args.priority,
            status: args.status,
            due_date: args.due,
            tags: tags_of(&args.tags),
        })
        .map_err(|e| e.to_string())?;
    println!("Created {} [{}] {}", task.id, task.status, task.title);
    Ok(())
}

/// Build the patch an `edit` invocation describes.
fn patch_of(args: &EditArgs) -> TaskPatch {
    TaskPatch {
        title: args.title.clone(),
        description: if args.clear_description { Some(None) } else { args.description.clone().map(Some) },
        priority: args.priority,
        status: args.status,
        due_date: if args.clear_due { Some(None) } else { args.due.map(Some) },
        tags: if args.clear_tags {
            Some(Tags::default())
        } else if args.tags.is_empty() {
            None
        } else {
            Some(tags_of(&args.tags))
        },
    }
}

/// Execute the `edit` command.
///
/// # Errors
///
/// Returns an error string if nothing would change, the task does not exist,
/// the new title is blank, or the write fails.
pub fn edit(switcher: &ContextSwitcher<'_>, config: &BoardConfig, args: &EditArgs) -> Result<(), String> {
    let patch = patch_of(args);
    if patch.is_empty() {
        return Err("Nothing to change; pass at least one field option.".to_string());
    }
    let mut store = open_store(switcher, config)?;
    match store.update(&args.id, patch).map_err(|e| e.to_string())? {
        Some(task) => {
            println!("Updated {} [{}] {}", task.id, task.status, task.title);
            Ok(())
        }
        None => Err(format!("No task with id {}", args.id)),
    }
}

/// Execute the `move` command.
///
/// # Errors
///
/// Returns an error string if the task does not exist or the write fails.
pub fn move_task(
    switcher: &ContextSwitcher<'_>,
    config: &BoardConfig,
    id: &str,
    status: Status,
) -> Result<(), String> {
    let mut store = open_store(switcher, config)?;
    let outcome = store.move_to(id, status).map_err(|e| e.to_string())?;
    let Some(outcome) = outcome else {
        return Err(format!("No task with id {id}"));
    };
    println!("Moved {} to {}", outcome.task.id, outcome.task.status);
    if let Some(done) = outcome.completion {
        println!("Completed in {}", timer::format_secs(done.total_time));
    }
    Ok(())
}

/// Execute the `rm` command. A missing id is reported but not an error.
///
/// # Errors
///
/// Returns an error string if the write fails.
pub fn remove(switcher: &ContextSwitcher<'_>, config: &BoardConfig, id: &str) -> Result<(), String> {
    let mut store = open_store(switcher, config)?;
    if store.remove(id).map_err(|e| e.to_string())? {
        println!("Deleted {id}");
    } else {
        println!("No task with id {id}; nothing deleted.");
    }
    Ok(())
}

/// Execute the `clear` command.
///
/// # Errors
///
/// Returns an error string without `--yes`, or if the write fails.
pub fn clear(switcher: &ContextSwitcher<'_>, config: &BoardConfig, yes: bool) -> Result<(), String> {
    if !yes {
        return Err(format!("Refusing to delete every task in the {} without --yes.", context_label(switcher)));
    }
    let mut store = open_store(switcher, config)?;
    let count = store.tasks().len();
    store.clear().map_err(|e| e.to_string())?;
    println!("Deleted {count} task(s).");
    Ok(())
}

/// Time column text: live elapsed while running, the snapshot once done.
fn time_cell(task: &Task, now: DateTime<Utc>) -> String {
    match task.status {
        Status::InProgress => format!("{} *", timer::format_secs(timer::elapsed(task, now))),
        Status::Done => timer::format_secs(task.total_time.unwrap_or(task.time_spent)),
        Status::Todo if task.time_spent > 0 => timer::format_secs(task.time_spent),
        Status::Todo => String::new(),
    }
}

/// Execute the `list` command.
///
/// Prints the projected view as a table followed by per-column counts.
///
/// # Errors
///
/// Returns an error string if the list cannot be loaded.
pub fn list(
    ctx: &ServiceContext,
    switcher: &ContextSwitcher<'_>,
    config: &BoardConfig,
    args: &ListArgs,
) -> Result<(), String> {
    let store = open_store(switcher, config)?;
    let filter = Filter { priority: args.priority, sort: args.sort, query: args.query.clone() };
    let view = project(store.tasks(), &filter);
    let now = ctx.clock.now();
    let today = now.date_naive();

    println!("{} ({} of {} task(s))", context_label(switcher), view.len(), store.tasks().len());
    if view.is_empty() {
        println!("No tasks match.");
        return Ok(());
    }

    let rows: Vec<[String; 7]> = view
        .iter()
        .map(|t| {
            let due = t.due_date.map_or_else(String::new, |d| {
                if t.is_overdue(today) { format!("{d} !") } else { d.to_string() }
            });
            [
                t.id.clone(),
                t.status.to_string(),
                t.priority.to_string(),
                t.title.clone(),
                due,
                time_cell(t, now),
                t.tags.iter().collect::<Vec<_>>().join(","),
            ]
        })
        .collect();

    let headers = ["ID", "STATUS", "PRIORITY", "TITLE", "DUE", "TIME", "TAGS"];
    let mut widths = headers.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    print_row(&headers.map(str::to_string), &widths);
    print_row(&widths.map(|w| "-".repeat(w)), &widths);
    for row in &rows {
        print_row(row, &widths);
    }

    let counts = ColumnCounts::of(view.iter().copied());
    println!(
        "\ntodo: {}  in progress: {}  done: {}",
        counts.get(Status::Todo),
        counts.get(Status::InProgress),
        counts.get(Status::Done)
    );
    Ok(())
}

fn print_row(cells: &[String; 7], widths: &[usize; 7]) {
    let line: Vec<String> =
        cells.iter().zip(widths).map(|(cell, width)| format!("{cell:<width$}")).collect();
    println!("{}", line.join("  ").trim_end());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::ManualClock;
    use crate::cli::{Cli, Command};
    use crate::storage::StorageGateway;
    use clap::Parser;

    fn parse(args: &[&str]) -> Command {
        Cli::parse_from(std::iter::once("taskboard").chain(args.iter().copied())).command
    }

    fn setup() -> (ManualClock, ServiceContext) {
        let clock = ManualClock::new("2024-04-01T10:00:00Z".parse().unwrap());
        (clock.clone(), ServiceContext::in_memory(clock))
    }

    #[test]
    fn add_edit_move_flow() {
        let (clock, ctx) = setup();
        let config = BoardConfig::default();
        let switcher = ContextSwitcher::open(&ctx, None).unwrap();

        let Command::Add(add_args) = parse(&["add", "Write", "-t", "a"]) else { unreachable!() };
        add(&switcher, &config, &add_args).unwrap();
        let Command::Edit(edit_args) = parse(&["edit", "id-1", "-s", "inprogress", "--clear-tags"]) else {
            unreachable!()
        };
        edit(&switcher, &config, &edit_args).unwrap();
        clock.advance_secs(90);
        move_task(&switcher, &config, "id-1", Status::Done).unwrap();

        let task = &StorageGateway::new(&ctx).load_tasks().unwrap()[0];
        assert_eq!(task.total_time, Some(90));
        assert!(task.tags.is_empty());
    }

    #[test]
    fn edit_without_fields_is_refused() {
        let (_clock, ctx) = setup();
        let switcher = ContextSwitcher::open(&ctx, None).unwrap();
        let Command::Edit(args) = parse(&["edit", "id-1"]) else { unreachable!() };
        assert!(edit(&switcher, &BoardConfig::default(), &args).is_err());
    }

    #[test]
    fn missing_ids() {
        let (_clock, ctx) = setup();
        let config = BoardConfig::default();
        let switcher = ContextSwitcher::open(&ctx, None).unwrap();
        assert!(move_task(&switcher, &config, "ghost", Status::Done).is_err());
        assert!(remove(&switcher, &config, "ghost").is_ok());
    }

    #[test]
    fn clear_needs_confirmation() {
        let (_clock, ctx) = setup();
        let config = BoardConfig::default();
        let switcher = ContextSwitcher::open(&ctx, None).unwrap();
        let Command::Add(args) = parse(&["add", "A"]) else { unreachable!() };
        add(&switcher, &config, &args).unwrap();

        assert!(clear(&switcher, &config, false).is_err());
        assert_eq!(StorageGateway::new(&ctx).load_tasks().unwrap().len(), 1);
        clear(&switcher, &config, true).unwrap();
        assert!(StorageGateway::new(&ctx).load_tasks().unwrap().is_empty());
    }

    #[test]
    fn list_runs_on_empty_and_filled_boards() {
        let (_clock, ctx) = setup();
        let config = BoardConfig::default();
        let switcher = ContextSwitcher::open(&ctx, None).unwrap();
        let Command::List(list_args) = parse(&["list", "-p", "high"]) else { unreachable!() };
        list(&ctx, &switcher, &config, &list_args).unwrap();

        let Command::Add(args) = parse(&["add", "A", "-p", "high", "--due", "2024-03-01"]) else {
            unreachable!()
        };
        add(&switcher, &config, &args).unwrap();
        list(&ctx, &switcher, &config, &list_args).unwrap();
    }

    #[test]
    fn time_cell_shapes() {
        let now: DateTime<Utc> = "2024-04-01T10:00:00Z".parse().unwrap();
        let mut task: Task = serde_json::from_str("{}").unwrap();
        assert_eq!(time_cell(&task, now), "");
        task.time_spent = 61;
        assert_eq!(time_cell(&task, now), "1m 1s");
        task.status = Status::Done;
        task.total_time = Some(125);
        assert_eq!(time_cell(&task, now), "2m 5s");
    }
}
