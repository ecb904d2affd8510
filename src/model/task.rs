//! Task record and its field types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::BoardError;

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Low priority.
    Low,
    /// Medium priority (the default).
    #[default]
    Medium,
    /// High priority.
    High,
}

impl Priority {
    /// All priorities, lowest first.
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    /// Sort rank; higher means more important.
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }

    /// Lowercase label used in storage and search.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" | "med" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority '{other}' (expected low, medium, high)")),
        }
    }
}

/// Board column a task sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Not started.
    #[default]
    Todo,
    /// Being worked on; the task timer accrues while in this column.
    InProgress,
    /// Finished.
    Done,
}

impl Status {
    /// All statuses in column order.
    pub const ALL: [Status; 3] = [Status::Todo, Status::InProgress, Status::Done];

    /// Storage label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "inprogress",
            Status::Done => "done",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "todo" => Ok(Status::Todo),
            "inprogress" | "doing" => Ok(Status::InProgress),
            "done" => Ok(Status::Done),
            other => Err(format!("unknown status '{other}' (expected todo, inprogress, done)")),
        }
    }
}

/// Ordered set of tag labels.
///
/// Insertion order is kept for display; an exact (case-sensitive) duplicate
/// is dropped on insert and when decoding stored data.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Tags(Vec<String>);

impl Tags {
    /// Creates an empty tag set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tag, trimming whitespace. Returns `false` for blanks and duplicates.
    pub fn insert(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.0.iter().any(|t| t == tag) {
            return false;
        }
        self.0.push(tag.to_string());
        true
    }

    /// Iterates tags in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no tags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for Tags {
    fn from(raw: Vec<String>) -> Self {
        raw.iter().map(String::as_str).collect()
    }
}

impl From<Tags> for Vec<String> {
    fn from(tags: Tags) -> Self {
        tags.0
    }
}

impl<'a> FromIterator<&'a str> for Tags {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut tags = Tags::new();
        for tag in iter {
            tags.insert(tag);
        }
        tags
    }
}

/// A single card on the board.
///
/// Timer fields: `start_time` is set exactly while the task is `InProgress`
/// and accruing; `time_spent` holds the seconds of all closed intervals;
/// `total_time` is the snapshot of `time_spent` taken when the task last
/// moved into `Done`.
///
/// Decoding never fails on a field: a value of the wrong shape falls back to
/// that field's default, so hand-edited or foreign records still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Opaque unique id.
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: String,
    /// Card title.
    #[serde(default, deserialize_with = "lenient")]
    pub title: String,
    /// Optional longer text.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "blank_as_none")]
    pub description: Option<String>,
    /// Priority.
    #[serde(default, deserialize_with = "lenient")]
    pub priority: Priority,
    /// Column.
    #[serde(default, deserialize_with = "lenient")]
    pub status: Status,
    /// Optional date-only deadline.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "blank_date")]
    pub due_date: Option<NaiveDate>,
    /// Labels.
    #[serde(default, deserialize_with = "lenient_tags")]
    pub tags: Tags,
    /// Creation time; never changed by edits.
    #[serde(default, deserialize_with = "lenient")]
    pub created_at: DateTime<Utc>,
    /// Start of the currently open timer interval.
    #[serde(default, deserialize_with = "lenient")]
    pub start_time: Option<DateTime<Utc>>,
    /// Seconds accrued in closed intervals.
    #[serde(default, deserialize_with = "lenient")]
    pub time_spent: u64,
    /// Seconds snapshotted on the last move into done.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub total_time: Option<u64>,
}

impl Task {
    /// Whether the task is past its due date and still open.
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status != Status::Done && self.due_date.is_some_and(|due| due < today)
    }

    /// Whether a timer interval is currently open.
    #[must_use]
    pub fn timer_open(&self) -> bool {
        self.start_time.is_some()
    }
}

/// Fields for a task about to be created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    /// Card title; must not be blank.
    pub title: String,
    /// Optional longer text.
    pub description: Option<String>,
    /// Priority.
    pub priority: Priority,
    /// Initial column.
    pub status: Status,
    /// Optional deadline.
    pub due_date: Option<NaiveDate>,
    /// Labels.
    pub tags: Tags,
}

impl NewTask {
    /// A `todo`/`medium` task with only a title.
    #[must_use]
    pub fn titled(title: &str) -> Self {
        Self { title: title.to_string(), ..Self::default() }
    }

    /// Sets the initial status.
    #[must_use]
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// Sets the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Checks required fields.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::Validation` when the title is blank.
    pub fn validate(&self) -> Result<(), BoardError> {
        if self.title.trim().is_empty() {
            return Err(BoardError::Validation { field: "title" });
        }
        Ok(())
    }
}

/// Partial update of a task.
///
/// Each `Some` field fully replaces the stored value; `None` leaves it alone.
/// The doubled options clear a field with `Some(None)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    /// New title; must not be blank.
    pub title: Option<String>,
    /// New description, or `Some(None)` to clear it.
    pub description: Option<Option<String>>,
    /// New priority.
    pub priority: Option<Priority>,
    /// New status; drives timer transitions.
    pub status: Option<Status>,
    /// New due date, or `Some(None)` to clear it.
    pub due_date: Option<Option<NaiveDate>>,
    /// Replacement tag set.
    pub tags: Option<Tags>,
}

impl TaskPatch {
    /// A patch that only changes status.
    #[must_use]
    pub fn status(status: Status) -> Self {
        Self { status: Some(status), ..Self::default() }
    }

    /// Whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Checks the fields that are present.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::Validation` when a title is given but blank.
    pub fn validate(&self) -> Result<(), BoardError> {
        if self.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(BoardError::Validation { field: "title" });
        }
        Ok(())
    }

    /// Writes every non-status field over `task`. Status is left to the
    /// caller because it carries timer side effects.
    pub(crate) fn merge_fields(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            task.description = description.filter(|d| !d.trim().is_empty());
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(tags) = self.tags {
            task.tags = tags;
        }
    }
}

// Any value that does not decode as `T` (wrong type, unknown variant, null)
// becomes `T::default()`.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(raw).unwrap_or_default())
}

fn lenient_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(id) => id,
        Value::Number(id) => id.to_string(),
        _ => String::new(),
    })
}

fn lenient_tags<'de, D>(deserializer: D) -> Result<Tags, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        _ => Tags::new(),
    })
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = lenient(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}

// Form submissions store an empty string for "no due date".
fn blank_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = lenient(deserializer)?;
    Ok(raw.and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()))
}
