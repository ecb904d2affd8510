//! Task list export and import.
//!
//! The file format is the same JSON array of task records that the `tasks`
//! record holds.

use chrono::NaiveDate;
use serde_json::Value;

use crate::error::BoardError;
use crate::model::Task;

/// File name for an export made on `today`.
#[must_use]
pub fn export_file_name(today: NaiveDate) -> String {
    format!("tasks-{}.json", today.format("%Y-%m-%d"))
}

/// Serializes `tasks` as a pretty-printed JSON array.
///
/// # Errors
///
/// Returns `BoardError::Storage` if serialization fails.
pub fn export_json(tasks: &[Task]) -> Result<String, BoardError> {
    serde_json::to_string_pretty(tasks).map_err(|err| BoardError::Storage(err.to_string()))
}

/// Reads an import file.
///
/// Only the outer shape is checked. Each record is taken as it is: a missing
/// or ill-typed field falls back to its default.
///
/// # Errors
///
/// Returns `BoardError::MalformedImport` if the text is not JSON, is not an
/// array, or holds an element that is not a task object.
pub fn parse_import(text: &str) -> Result<Vec<Task>, BoardError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|err| BoardError::MalformedImport(format!("invalid JSON: {err}")))?;
    let Value::Array(items) = value else {
        return Err(BoardError::MalformedImport("expected a JSON array of tasks".to_string()));
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_object() {
                return Err(BoardError::MalformedImport(format!("item {index} is not an object")));
            }
            serde_json::from_value(item)
                .map_err(|err| BoardError::MalformedImport(format!("item {index}: {err}")))
        })
        .collect()
}
