//! Derived board statistics.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::model::{Priority, Status, Task};

/// Task counts per column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnCounts {
    /// `todo` column.
    pub todo: usize,
    /// `inprogress` column.
    pub in_progress: usize,
    /// `done` column.
    pub done: usize,
}

impl ColumnCounts {
    /// Counts `tasks` by status.
    pub fn of<'t>(tasks: impl IntoIterator<Item = &'t Task>) -> Self {
        let mut counts = Self::default();
        for task in tasks {
            match task.status {
                Status::Todo => counts.todo += 1,
                Status::InProgress => counts.in_progress += 1,
                Status::Done => counts.done += 1,
            }
        }
        counts
    }

    /// Count for one column.
    #[must_use]
    pub fn get(&self, status: Status) -> usize {
        match status {
            Status::Todo => self.todo,
            Status::InProgress => self.in_progress,
            Status::Done => self.done,
        }
    }
}

/// Task counts per priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PriorityBreakdown {
    /// Low priority tasks.
    pub low: usize,
    /// Medium priority tasks.
    pub medium: usize,
    /// High priority tasks.
    pub high: usize,
}

/// Summary numbers for the statistics panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardStats {
    /// All tasks.
    pub total: usize,
    /// Per-column counts.
    pub columns: ColumnCounts,
    /// Open tasks due strictly before today.
    pub overdue: usize,
    /// Done as a rounded percentage of total; 0 when empty.
    pub completion_rate: u8,
    /// High priority tasks.
    pub high_priority: usize,
    /// Open tasks due today.
    pub due_today: usize,
    /// Open tasks due today through the next seven days.
    pub due_this_week: usize,
    /// Per-priority counts.
    pub priorities: PriorityBreakdown,
}

impl BoardStats {
    /// Computes statistics over `tasks` as of `today`.
    #[must_use]
    pub fn compute(tasks: &[Task], today: NaiveDate) -> Self {
        let week_end = today.checked_add_days(Days::new(7)).unwrap_or(NaiveDate::MAX);
        let mut stats = Self {
            total: tasks.len(),
            columns: ColumnCounts::of(tasks),
            ..Self::default()
        };

        for task in tasks {
            if task.is_overdue(today) {
                stats.overdue += 1;
            }
            match task.priority {
                Priority::Low => stats.priorities.low += 1,
                Priority::Medium => stats.priorities.medium += 1,
                Priority::High => stats.priorities.high += 1,
            }
            if let Some(due) = task.due_date.filter(|_| task.status != Status::Done) {
                if due == today {
                    stats.due_today += 1;
                }
                if (today..=week_end).contains(&due) {
                    stats.due_this_week += 1;
                }
            }
        }
        stats.high_priority = stats.priorities.high;
        stats.completion_rate = completion_rate(stats.columns.done, stats.total);
        stats
    }
}

fn completion_rate(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    // rounds half up, like Math.round on a percentage
    let pct = (done * 200 + total) / (total * 2);
    u8::try_from(pct).unwrap_or(100)
}
