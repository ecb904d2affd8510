//! Edit sessions: the value a form holds between opening and saving.

use chrono::NaiveDate;

use super::TaskStore;
use crate::error::BoardError;
use crate::model::{NewTask, Priority, Status, Tags, Task, TaskPatch};

/// What a session will write to on commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    /// A task that does not exist yet.
    New,
    /// An existing task, by id.
    Existing(String),
}

/// A draft of task fields, detached from the store until committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    target: EditTarget,
    /// Draft title.
    pub title: String,
    /// Draft description.
    pub description: Option<String>,
    /// Draft priority.
    pub priority: Priority,
    /// Draft status.
    pub status: Status,
    /// Draft deadline.
    pub due_date: Option<NaiveDate>,
    /// Draft labels.
    pub tags: Tags,
}

impl EditSession {
    /// A blank draft for a new task, optionally pre-placed in a column.
    #[must_use]
    pub fn blank(status: Status) -> Self {
        Self {
            target: EditTarget::New,
            title: String::new(),
            description: None,
            priority: Priority::default(),
            status,
            due_date: None,
            tags: Tags::default(),
        }
    }

    fn of(task: &Task) -> Self {
        Self {
            target: EditTarget::Existing(task.id.clone()),
            title: task.title.clone(),
            description: task.description.clone(),
            priority: task.priority,
            status: task.status,
            due_date: task.due_date,
            tags: task.tags.clone(),
        }
    }

    /// The session's target.
    #[must_use]
    pub fn target(&self) -> &EditTarget {
        &self.target
    }
}

impl TaskStore<'_> {
    /// Opens an edit session prefilled from task `id`.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::NotFound` when no such task exists.
    pub fn open_editor(&self, id: &str) -> Result<EditSession, BoardError> {
        self.get(id).map(EditSession::of).ok_or_else(|| BoardError::not_found("task", id))
    }

    /// Writes a session back, creating or updating as its target says.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::Validation` for a blank title and
    /// `BoardError::NotFound` when the edited task was deleted while the
    /// session was open.
    pub fn commit_edit(&mut self, session: EditSession) -> Result<Task, BoardError> {
        match session.target {
            EditTarget::New => self.create(NewTask {
                title: session.title,
                description: session.description,
                priority: session.priority,
                status: session.status,
                due_date: session.due_date,
                tags: session.tags,
            }),
            EditTarget::Existing(id) => {
                let patch = TaskPatch {
                    title: Some(session.title),
                    description: Some(session.description),
                    priority: Some(session.priority),
                    status: Some(session.status),
                    due_date: Some(session.due_date),
                    tags: Some(session.tags),
                };
                self.update(&id, patch)?.ok_or_else(|| BoardError::not_found("task", &id))
            }
        }
    }
}
