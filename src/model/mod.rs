//! Persisted record types.
//!
//! Field names serialize in camelCase so the JSON stored under `tasks`,
//! `routines`, and `settings` keeps the shape exported files use.

mod member;
mod settings;
mod task;

pub use member::{ColorTheme, Member, Roster};
pub use settings::{SettingKey, Settings};
pub use task::{NewTask, Priority, Status, Tags, Task, TaskPatch};
