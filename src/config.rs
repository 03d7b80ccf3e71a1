use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const DATA_DIR_ENV: &str = "TASKPAD_DATA_DIR";

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "io error: {err}"),
            ConfigError::Json(err) => write!(f, "json error: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        ConfigError::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        ConfigError::Json(value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_tasks_key")]
    pub tasks_key: String,
    #[serde(default = "default_theme_key")]
    pub theme_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            tasks_key: default_tasks_key(),
            theme_key: default_theme_key(),
        }
    }
}

impl Config {
    /// Reads a JSON config file; fields missing from the file take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Defaults, with the data directory overridable through `TASKPAD_DATA_DIR`.
    pub fn from_env() -> Self {
        Self::default().with_data_dir_override(std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
    }

    fn with_data_dir_override(mut self, data_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = data_dir.filter(|dir| !dir.as_os_str().is_empty()) {
            self.data_dir = dir;
        }
        self
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("taskpad"))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_tasks_key() -> String {
    "tasks".to_string()
}

fn default_theme_key() -> String {
    "theme".to_string()
}
