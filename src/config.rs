//! Persisted user settings (live in the OS config directory).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::timeline::{DEFAULT_CELL_WIDTH, MAX_CELL_WIDTH, MIN_CELL_WIDTH};

const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Pixels per day on the timeline.
    pub cell_width: f32,
    /// Log filter handed to the logger, e.g. `info` or `gantt_engine=debug`.
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cell_width: DEFAULT_CELL_WIDTH,
            log_level: "info".into(),
        }
    }
}

impl Settings {
    /// Path of the settings file, falling back to the working directory when the
    /// platform has no config directory.
    pub fn default_path() -> PathBuf {
        match directories::ProjectDirs::from("", "", "GanttEngine") {
            Some(dirs) => dirs.config_dir().join(SETTINGS_FILE),
            None => PathBuf::from(".").join(SETTINGS_FILE),
        }
    }

    pub fn load() -> Self {
        Self::load_from(&Self::default_path())
    }

    /// Read settings from `path`. A missing or unreadable file yields defaults.
    pub fn load_from(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(err) => {
                log::warn!("failed to read settings {}: {err}", path.display());
                return Self::default();
            }
        };
        match serde_json::from_str::<Settings>(&contents) {
            Ok(settings) => settings.normalized(),
            Err(err) => {
                log::warn!("failed to parse settings {}: {err}", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self) -> std::io::Result<()> {
        self.save_to(&Self::default_path())
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    fn normalized(mut self) -> Self {
        self.cell_width = if self.cell_width.is_finite() {
            self.cell_width.clamp(MIN_CELL_WIDTH, MAX_CELL_WIDTH)
        } else {
            DEFAULT_CELL_WIDTH
        };
        self
    }
}
