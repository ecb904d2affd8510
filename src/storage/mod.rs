//! Storage gateway: typed access to the named JSON records.
//!
//! All I/O goes through `ctx.kv`, so the gateway works the same over the
//! file-backed store and the in-memory one. Record layout:
//!
//! ```text
//! tasks            JSON array of Task (default collection)
//! settings         {darkMode, showStats, animations, minimalistView}
//! routines         {members: [Member]} (each member owns a task array)
//! currentMemberId  raw member id, absent when the default list is active
//! pomodoroTimer    focus timer snapshot
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::context::ServiceContext;
use crate::error::BoardError;
use crate::model::{Roster, Settings, Task};
use crate::timer::PomodoroSnapshot;

/// Record keys in the key-value store.
pub mod keys {
    /// Default task collection.
    pub const TASKS: &str = "tasks";
    /// Display preferences.
    pub const SETTINGS: &str = "settings";
    /// Member roster, including each member's tasks.
    pub const ROUTINES: &str = "routines";
    /// Id of the active member.
    pub const CURRENT_MEMBER: &str = "currentMemberId";
    /// Focus timer snapshot.
    pub const POMODORO: &str = "pomodoroTimer";
}

/// Typed reads and writes of the board's persisted records.
pub struct StorageGateway<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> StorageGateway<'a> {
    /// Creates a gateway over the context's key-value store.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Reads and decodes a record.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::Storage` if the store fails and
    /// `BoardError::Parse` if the record is not valid JSON for `T`.
    pub fn read<T: DeserializeOwned>(&self, key: &'static str) -> Result<Option<T>, BoardError> {
        let Some(raw) = self.ctx.kv.get(key).map_err(storage_err(key))? else {
            return Ok(None);
        };
        serde_json::from_str(&raw).map(Some).map_err(|source| BoardError::Parse { key, source })
    }

    /// Reads a record, treating a corrupted value as "no prior state".
    ///
    /// # Errors
    ///
    /// Returns `BoardError::Storage` if the store itself fails.
    pub fn read_or_default<T: DeserializeOwned + Default>(
        &self,
        key: &'static str,
    ) -> Result<T, BoardError> {
        match self.read(key) {
            Ok(value) => Ok(value.unwrap_or_default()),
            Err(BoardError::Parse { key, source }) => {
                tracing::warn!(key, error = %source, "stored record is corrupted; starting fresh");
                Ok(T::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Encodes and writes a record, replacing the previous value.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::Storage` if encoding or the write fails.
    pub fn write<T: Serialize + ?Sized>(&self, key: &'static str, value: &T) -> Result<(), BoardError> {
        let json = serde_json::to_string(value)
            .map_err(|e| BoardError::Storage(format!("failed to encode {key}: {e}")))?;
        self.ctx.kv.set(key, &json).map_err(storage_err(key))
    }

    /// Removes a record.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::Storage` if the store fails.
    pub fn remove(&self, key: &'static str) -> Result<(), BoardError> {
        self.ctx.kv.remove(key).map_err(storage_err(key))
    }

    /// Loads the default task collection.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::Storage` if the store fails.
    pub fn load_tasks(&self) -> Result<Vec<Task>, BoardError> {
        self.read_or_default(keys::TASKS)
    }

    /// Saves the default task collection.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::Storage` if the write fails.
    pub fn save_tasks(&self, tasks: &[Task]) -> Result<(), BoardError> {
        self.write(keys::TASKS, tasks)
    }

    /// Loads the member roster.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::Storage` if the store fails.
    pub fn load_roster(&self) -> Result<Roster, BoardError> {
        self.read_or_default(keys::ROUTINES)
    }

    /// Saves the member roster.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::Storage` if the write fails.
    pub fn save_roster(&self, roster: &Roster) -> Result<(), BoardError> {
        self.write(keys::ROUTINES, roster)
    }

    /// Reads the remembered active member id.
    ///
    /// The id is stored as raw text; the literal `null` and blanks read as absent.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::Storage` if the store fails.
    pub fn current_member_id(&self) -> Result<Option<String>, BoardError> {
        let raw = self.ctx.kv.get(keys::CURRENT_MEMBER).map_err(storage_err(keys::CURRENT_MEMBER))?;
        Ok(raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty() && s != "null"))
    }

    /// Remembers (or forgets, with `None`) the active member id.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::Storage` if the store fails.
    pub fn set_current_member_id(&self, id: Option<&str>) -> Result<(), BoardError> {
        match id {
            Some(id) => {
                self.ctx.kv.set(keys::CURRENT_MEMBER, id).map_err(storage_err(keys::CURRENT_MEMBER))
            }
            None => self.remove(keys::CURRENT_MEMBER),
        }
    }

    /// Loads display preferences.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::Storage` if the store fails.
    pub fn load_settings(&self) -> Result<Settings, BoardError> {
        self.read_or_default(keys::SETTINGS)
    }

    /// Saves display preferences.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::Storage` if the write fails.
    pub fn save_settings(&self, settings: &Settings) -> Result<(), BoardError> {
        self.write(keys::SETTINGS, settings)
    }

    /// Loads the focus timer snapshot, if any.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::Storage` if the store fails.
    pub fn load_pomodoro(&self) -> Result<Option<PomodoroSnapshot>, BoardError> {
        self.read_or_default::<Option<PomodoroSnapshot>>(keys::POMODORO)
    }

    /// Saves the focus timer snapshot.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::Storage` if the write fails.
    pub fn save_pomodoro(&self, snapshot: &PomodoroSnapshot) -> Result<(), BoardError> {
        self.write(keys::POMODORO, snapshot)
    }
}

fn storage_err(key: &'static str) -> impl Fn(crate::ports::StoreError) -> BoardError {
    move |e| BoardError::Storage(format!("{key}: {e}"))
}
