//! User display preferences.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The `settings` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Dark color scheme.
    pub dark_mode: bool,
    /// Show the statistics dashboard.
    pub show_stats: bool,
    /// Card animations.
    pub animations: bool,
    /// Compact single-column layout.
    pub minimalist_view: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self { dark_mode: false, show_stats: true, animations: true, minimalist_view: false }
    }
}

/// Names one preference flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    /// `darkMode`.
    DarkMode,
    /// `showStats`.
    ShowStats,
    /// `animations`.
    Animations,
    /// `minimalistView`.
    MinimalistView,
}

impl SettingKey {
    /// Every key, in display order.
    pub const ALL: [SettingKey; 4] =
        [SettingKey::DarkMode, SettingKey::ShowStats, SettingKey::Animations, SettingKey::MinimalistView];
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            SettingKey::DarkMode => "dark-mode",
            SettingKey::ShowStats => "show-stats",
            SettingKey::Animations => "animations",
            SettingKey::MinimalistView => "minimalist-view",
        })
    }
}

impl FromStr for SettingKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String =
            s.chars().filter(|c| c.is_ascii_alphanumeric()).collect::<String>().to_ascii_lowercase();
        match normalized.as_str() {
            "darkmode" | "dark" => Ok(SettingKey::DarkMode),
            "showstats" | "stats" => Ok(SettingKey::ShowStats),
            "animations" => Ok(SettingKey::Animations),
            "minimalistview" | "minimalist" => Ok(SettingKey::MinimalistView),
            _ => Err(format!(
                "unknown setting '{s}' (expected dark-mode, show-stats, animations, minimalist-view)"
            )),
        }
    }
}

impl Settings {
    /// Reads one flag.
    #[must_use]
    pub fn get(&self, key: SettingKey) -> bool {
        match key {
            SettingKey::DarkMode => self.dark_mode,
            SettingKey::ShowStats => self.show_stats,
            SettingKey::Animations => self.animations,
            SettingKey::MinimalistView => self.minimalist_view,
        }
    }

    /// Writes one flag.
    pub fn set(&mut self, key: SettingKey, value: bool) {
        let slot = match key {
            SettingKey::DarkMode => &mut self.dark_mode,
            SettingKey::ShowStats => &mut self.show_stats,
            SettingKey::Animations => &mut self.animations,
            SettingKey::MinimalistView => &mut self.minimalist_view,
        };
        *slot = value;
    }

    /// Flips one flag and returns its new value.
    pub fn toggle(&mut self, key: SettingKey) -> bool {
        let value = !self.get(key);
        self.set(key, value);
        value
    }
}
