use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Store file location (default: $XDG_DATA_HOME/exectasks/storage.json)
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Maximum total size of stored keys and values, in bytes. Absent = unlimited.
    #[serde(default)]
    pub quota_bytes: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// How long the "saved" indicator stays up after a write
    #[serde(default = "default_save_indicator_ms")]
    pub save_indicator_ms: u64,
    /// Dark-mode preference used to pick the first-run theme.
    /// Absent = detect from the terminal.
    #[serde(default)]
    pub prefers_dark: Option<bool>,
    /// Number of tasks in the day plan (focused + up next)
    #[serde(default = "default_plan_size")]
    pub plan_size: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            save_indicator_ms: default_save_indicator_ms(),
            prefers_dark: None,
            plan_size: default_plan_size(),
        }
    }
}

fn default_save_indicator_ms() -> u64 {
    2000
}

fn default_plan_size() -> usize {
    3
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    /// tracing filter directive, e.g. "warn" or "exectasks=debug"
    #[serde(default)]
    pub level: Option<String>,
}
