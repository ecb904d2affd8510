//! Household members and their task lists.

use serde::{Deserialize, Serialize};

use super::task::Task;

/// Two-stop gradient used to tint the board while a member is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorTheme {
    /// Gradient start color (`#rrggbb`).
    pub start: String,
    /// Gradient end color (`#rrggbb`).
    pub end: String,
}

/// A household member with a private task list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Opaque unique id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Routine names used to seed the initial task list.
    #[serde(default)]
    pub routines: Vec<String>,
    /// Derived theme; filled in on load when missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_theme: Option<ColorTheme>,
    /// This member's task collection.
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// The `routines` record: every member, in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    /// Members in display order.
    #[serde(default)]
    pub members: Vec<Member>,
}

impl Roster {
    /// Finds a member by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    /// Finds a member by id for mutation.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Member> {
        self.members.iter_mut().find(|m| m.id == id)
    }

    /// Position of a member in display order.
    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.members.iter().position(|m| m.id == id)
    }

    /// Removes a member, returning it if present.
    pub fn remove(&mut self, id: &str) -> Option<Member> {
        let idx = self.position(id)?;
        Some(self.members.remove(idx))
    }
}
