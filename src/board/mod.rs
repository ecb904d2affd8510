//! The active task collection and everything that mutates it.

mod edit;
mod stats;
mod store;

pub use edit::{EditSession, EditTarget};
pub use stats::{BoardStats, ColumnCounts, PriorityBreakdown};
pub use store::{Completion, Healed, MoveOutcome, TaskStore};

use std::fmt;

/// Which task collection is active.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Scope {
    /// The unscoped default list (`tasks` record).
    #[default]
    Default,
    /// One member's list inside the `routines` record.
    Member(String),
}

impl Scope {
    /// The member id, if a member's list is active.
    #[must_use]
    pub fn member_id(&self) -> Option<&str> {
        match self {
            Scope::Default => None,
            Scope::Member(id) => Some(id),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Default => f.write_str("default"),
            Scope::Member(id) => write!(f, "member:{id}"),
        }
    }
}
