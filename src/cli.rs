//! CLI argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::model::{Priority, SettingKey, Status};
use crate::projector::{PriorityFilter, SortOrder};
use crate::timer::Preset;

/// Top-level CLI parser for `taskboard`.
#[derive(Debug, Parser)]
#[command(name = "taskboard", version, about = "Local kanban board with task timers and a focus timer")]
pub struct Cli {
    /// Store directory (defaults to `$TASKBOARD_STORE` or `.taskboard`).
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Open a member's list, overriding and replacing the remembered one.
    #[arg(long, global = true)]
    pub member: Option<String>,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a task.
    Add(AddArgs),
    /// Change fields of a task.
    Edit(EditArgs),
    /// Move a task to another column.
    Move {
        /// Task id.
        id: String,
        /// Target column: todo, inprogress, done.
        status: Status,
    },
    /// Delete a task.
    Rm {
        /// Task id.
        id: String,
    },
    /// Delete every task in the active list.
    Clear {
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },
    /// Show the board.
    List(ListArgs),
    /// Show statistics for the active list.
    Stats {
        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Write the active list as JSON.
    Export {
        /// Output file (`-` for stdout); defaults to `tasks-<date>.json`.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace the active list with a JSON file.
    Import {
        /// File to read.
        path: PathBuf,
        /// Confirm replacing every task.
        #[arg(long)]
        yes: bool,
    },
    /// Manage members.
    #[command(subcommand)]
    Member(MemberCommand),
    /// Control the focus timer.
    #[command(subcommand)]
    Pomodoro(PomodoroCommand),
    /// Show or change display preferences.
    Settings {
        /// Change to apply; shows the flags when absent.
        #[command(subcommand)]
        action: Option<SettingsCommand>,
    },
    /// Run the live timers in the foreground.
    Watch {
        /// Stop after this many one-second refreshes.
        #[arg(long)]
        ticks: Option<u64>,
    },
}

/// Arguments for `add`.
#[derive(Debug, Args)]
pub struct AddArgs {
    /// Task title.
    pub title: String,
    /// Longer description.
    #[arg(short, long)]
    pub description: Option<String>,
    /// Priority: low, medium, high.
    #[arg(short, long, default_value = "medium")]
    pub priority: Priority,
    /// Initial column.
    #[arg(short, long, default_value = "todo")]
    pub status: Status,
    /// Due date (YYYY-MM-DD).
    #[arg(long)]
    pub due: Option<NaiveDate>,
    /// Tag; repeat for several.
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,
}

/// Arguments for `edit`.
#[derive(Debug, Args)]
pub struct EditArgs {
    /// Task id.
    pub id: String,
    /// New title.
    #[arg(long)]
    pub title: Option<String>,
    /// New description.
    #[arg(short, long, conflicts_with = "clear_description")]
    pub description: Option<String>,
    /// Remove the description.
    #[arg(long)]
    pub clear_description: bool,
    /// New priority.
    #[arg(short, long)]
    pub priority: Option<Priority>,
    /// New column.
    #[arg(short, long)]
    pub status: Option<Status>,
    /// New due date (YYYY-MM-DD).
    #[arg(long, conflicts_with = "clear_due")]
    pub due: Option<NaiveDate>,
    /// Remove the due date.
    #[arg(long)]
    pub clear_due: bool,
    /// Replacement tags; repeat for several.
    #[arg(short, long = "tag", conflicts_with = "clear_tags")]
    pub tags: Vec<String>,
    /// Remove every tag.
    #[arg(long)]
    pub clear_tags: bool,
}

/// Arguments for `list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Priority filter: all, low, medium, high.
    #[arg(short, long, default_value = "all")]
    pub priority: PriorityFilter,
    /// Sort: date, priority, dueDate, title.
    #[arg(long, default_value = "date")]
    pub sort: SortOrder,
    /// Search in titles, descriptions, priorities and tags.
    #[arg(short, long)]
    pub query: Option<String>,
}

/// Member subcommands.
#[derive(Debug, Subcommand)]
pub enum MemberCommand {
    /// Add a member, seeding one task per routine.
    Add {
        /// Display name.
        name: String,
        /// Routine; repeat for several.
        #[arg(short, long = "routine")]
        routines: Vec<String>,
    },
    /// Rename a member and replace its routines.
    Edit {
        /// Member id.
        id: String,
        /// New display name.
        name: String,
        /// Routine; repeat for several.
        #[arg(short, long = "routine")]
        routines: Vec<String>,
    },
    /// Delete a member and its tasks.
    Rm {
        /// Member id.
        id: String,
    },
    /// List members.
    List,
    /// Make a member's list active.
    Use {
        /// Member id.
        id: String,
    },
    /// Return to the default list.
    Default,
}

/// Focus timer subcommands.
#[derive(Debug, Subcommand)]
pub enum PomodoroCommand {
    /// Start with a preset, or resume a paused session.
    Start {
        /// Preset: short (25/5) or long (45/10).
        preset: Option<Preset>,
    },
    /// Pause the countdown.
    Pause,
    /// Reload the full duration of the current mode.
    Reset,
    /// End the session.
    Stop,
    /// Show the session.
    Status,
}

/// Settings subcommands.
#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Set a flag.
    Set {
        /// dark-mode, show-stats, animations, minimalist-view.
        key: SettingKey,
        /// New value.
        #[arg(action = clap::ArgAction::Set)]
        value: bool,
    },
    /// Flip a flag.
    Toggle {
        /// dark-mode, show-stats, animations, minimalist-view.
        key: SettingKey,
    },
}
