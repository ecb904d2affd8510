//! Runtime configuration.
//!
//! Layers, later ones winning: built-in defaults, `<store>/config.yaml`,
//! environment (`TASKBOARD_*`), then command-line flags. The store directory
//! itself comes only from the flag, the environment or the default, since the
//! YAML file lives inside it.

use std::path::{Path, PathBuf};

use chrono::TimeDelta;
use serde::Deserialize;

use crate::timer::STALE_AFTER;

/// Default store directory, relative to the working directory.
pub const DEFAULT_STORE_DIR: &str = ".taskboard";

/// Name of the optional YAML file inside the store directory.
pub const CONFIG_FILE: &str = "config.yaml";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable single lines.
    #[default]
    Compact,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Compact
        }
    }
}

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    /// Directory holding the record files.
    pub store_dir: PathBuf,
    /// Age after which open task timers are checkpointed on load.
    pub stale_after: TimeDelta,
    /// `EnvFilter` directive; `None` uses the built-in default.
    pub log_filter: Option<String>,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
            stale_after: STALE_AFTER,
            log_filter: None,
            log_format: LogFormat::Compact,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    stale_after_hours: Option<u32>,
    log: Option<String>,
    log_format: Option<LogFormat>,
}

impl BoardConfig {
    /// Resolves configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `config.yaml` exists but cannot be read or parsed.
    pub fn load(store_flag: Option<&Path>) -> Result<Self, String> {
        Self::resolve(store_flag, |name| std::env::var(name).ok())
    }

    /// Resolves configuration with an explicit environment lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if `config.yaml` exists but cannot be read or parsed.
    pub fn resolve<F>(store_flag: Option<&Path>, env: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(dir) = store_flag.map(Path::to_path_buf).or_else(|| env("TASKBOARD_STORE").map(PathBuf::from)) {
            config.store_dir = dir;
        }

        let file = read_file_config(&config.store_dir.join(CONFIG_FILE))?;
        if let Some(hours) = file.stale_after_hours {
            config.stale_after = TimeDelta::hours(i64::from(hours));
        }
        config.log_filter = file.log;
        if let Some(format) = file.log_format {
            config.log_format = format;
        }

        if let Some(filter) = env("TASKBOARD_LOG").filter(|f| !f.trim().is_empty()) {
            config.log_filter = Some(filter);
        }
        if let Some(format) = env("TASKBOARD_LOG_FORMAT") {
            config.log_format = LogFormat::parse(&format);
        }
        Ok(config)
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, String> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(FileConfig::default()),
        Err(err) => return Err(format!("Failed to read {}: {err}", path.display())),
    };
    if content.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    serde_yaml::from_str(&content).map_err(|e| format!("Failed to parse {}: {e}", path.display()))
}
