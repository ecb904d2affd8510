//! Error taxonomy for board operations.

/// Errors surfaced by the board core.
///
/// Not-found conditions on tasks are reported as `Ok(None)` by the task
/// store rather than through this type; `NotFound` is used where a missing
/// record has to abort the operation (members, edit sessions).
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    /// A required field was empty. The operation was aborted unchanged.
    #[error("{field} must not be empty")]
    Validation {
        /// Name of the offending field.
        field: &'static str,
    },

    /// The referenced record no longer exists.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Record kind, e.g. `"task"` or `"member"`.
        kind: &'static str,
        /// Id that was looked up.
        id: String,
    },

    /// Imported content was not a JSON array of task records.
    #[error("import rejected: {0}")]
    MalformedImport(String),

    /// A persisted record could not be decoded.
    #[error("failed to parse stored record {key}: {source}")]
    Parse {
        /// Record key in the key-value store.
        key: &'static str,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// The focus timer was asked to start without a preset.
    #[error("select a preset before starting the timer")]
    NoPreset,

    /// The backing key-value store failed.
    #[error("storage error: {0}")]
    Storage(String),
}

impl BoardError {
    /// Shorthand for a `NotFound` error.
    #[must_use]
    pub fn not_found(kind: &'static str, id: &str) -> Self {
        Self::NotFound { kind, id: id.to_string() }
    }
}
