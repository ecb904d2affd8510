//! Read-only filtered and sorted views of a task list.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use icu_collator::options::CollatorOptions;
use icu_collator::{Collator, CollatorBorrowed, CollatorPreferences};

use crate::model::{Priority, Task};

/// Which priorities a view keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriorityFilter {
    /// Every task.
    #[default]
    All,
    /// Only tasks of this priority.
    Only(Priority),
}

impl PriorityFilter {
    fn keeps(self, task: &Task) -> bool {
        match self {
            PriorityFilter::All => true,
            PriorityFilter::Only(p) => task.priority == p,
        }
    }
}

impl FromStr for PriorityFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(PriorityFilter::All);
        }
        s.parse().map(PriorityFilter::Only)
    }
}

impl fmt::Display for PriorityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriorityFilter::All => f.write_str("all"),
            PriorityFilter::Only(p) => write!(f, "{p}"),
        }
    }
}

/// Ordering of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Newest first.
    #[default]
    Created,
    /// High to low.
    Priority,
    /// Earliest deadline first; undated last.
    DueDate,
    /// Alphabetical, ignoring case.
    Title,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date" | "created" | "createdat" => Ok(SortOrder::Created),
            "priority" => Ok(SortOrder::Priority),
            "duedate" | "due" => Ok(SortOrder::DueDate),
            "title" | "name" => Ok(SortOrder::Title),
            other => Err(format!("unknown sort order '{other}' (expected date, priority, dueDate or title)")),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortOrder::Created => "date",
            SortOrder::Priority => "priority",
            SortOrder::DueDate => "dueDate",
            SortOrder::Title => "title",
        })
    }
}

/// Filter and sort settings of a view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Filter {
    /// Priority filter.
    pub priority: PriorityFilter,
    /// Sort order.
    pub sort: SortOrder,
    /// Case-insensitive text search; blank means none.
    pub query: Option<String>,
}

impl Filter {
    /// Back to all priorities, newest first, no search.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Whether `task` matches `query` in its title, description, priority label
/// or any tag, ignoring case.
#[must_use]
pub fn matches_query(task: &Task, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    let hit = |text: &str| text.to_lowercase().contains(&needle);
    hit(&task.title)
        || task.description.as_deref().is_some_and(hit)
        || hit(task.priority.label())
        || task.tags.iter().any(hit)
}

/// Tasks matching `query`, in input order.
pub fn search<'t, I>(tasks: I, query: &str) -> Vec<&'t Task>
where
    I: IntoIterator<Item = &'t Task>,
{
    tasks.into_iter().filter(|t| matches_query(t, query)).collect()
}

/// Applies `filter` to `tasks`, returning a new ordered view.
///
/// Ties keep input order, so projecting a projection changes nothing.
pub fn project<'t, I>(tasks: I, filter: &Filter) -> Vec<&'t Task>
where
    I: IntoIterator<Item = &'t Task>,
{
    let query = filter.query.as_deref().unwrap_or("");
    let mut view: Vec<&Task> = tasks
        .into_iter()
        .filter(|t| filter.priority.keeps(t) && matches_query(t, query))
        .collect();
    let collator = if filter.sort == SortOrder::Title { title_collator() } else { None };
    view.sort_by(|a, b| compare(a, b, filter.sort, collator.as_ref()));
    view
}

// Root-locale collation: accents and case are secondary to the base letter.
fn title_collator() -> Option<CollatorBorrowed<'static>> {
    match Collator::try_new(CollatorPreferences::default(), CollatorOptions::default()) {
        Ok(collator) => Some(collator),
        Err(err) => {
            tracing::warn!(error = %err, "title collation unavailable; comparing case-folded text");
            None
        }
    }
}

fn compare(
    a: &Task,
    b: &Task,
    order: SortOrder,
    collator: Option<&CollatorBorrowed<'static>>,
) -> Ordering {
    match order {
        SortOrder::Created => b.created_at.cmp(&a.created_at),
        SortOrder::Priority => b.priority.rank().cmp(&a.priority.rank()),
        SortOrder::DueDate => match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        SortOrder::Title => match collator {
            Some(collator) => collator.compare(&a.title, &b.title),
            None => a
                .title
                .to_lowercase()
                .cmp(&b.title.to_lowercase())
                .then_with(|| a.title.cmp(&b.title)),
        },
    }
}
