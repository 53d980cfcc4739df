use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::model::config::AppConfig;

const APP_DIR: &str = "exectasks";

/// Error type for config loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Default config file path, respecting XDG_CONFIG_HOME
pub fn default_config_path() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", ".config")
        .join(APP_DIR)
        .join("config.toml")
}

/// Default store file path, respecting XDG_DATA_HOME
pub fn default_store_path() -> PathBuf {
    xdg_dir("XDG_DATA_HOME", ".local/share")
        .join(APP_DIR)
        .join("storage.json")
}

fn xdg_dir(var: &str, home_fallback: &str) -> PathBuf {
    std::env::var(var)
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(home_fallback))
}

fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

/// Read the config at `path`. A missing file yields the defaults.
pub fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(AppConfig::default());
    }
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Store path to use: explicit override, then config, then the XDG default.
pub fn resolve_store_path(config: &AppConfig, override_path: Option<&Path>) -> PathBuf {
    override_path
        .map(Path::to_path_buf)
        .or_else(|| config.storage.path.clone())
        .unwrap_or_else(default_store_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_is_default() {
        let tmp = TempDir::new().unwrap();
        let config = read_config(&tmp.path().join("config.toml")).unwrap();
        assert_eq!(config.ui.save_indicator_ms, 2000);
    }

    #[test]
    fn test_reads_values_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            r#"[storage]
path = "/tmp/elsewhere.json"

[ui]
save_indicator_ms = 500
plan_size = 5

[log]
level = "debug"
"#,
        )
        .unwrap();

        let config = read_config(&path).unwrap();
        assert_eq!(config.storage.path, Some(PathBuf::from("/tmp/elsewhere.json")));
        assert_eq!(config.ui.save_indicator_ms, 500);
        assert_eq!(config.ui.plan_size, 5);
        assert_eq!(config.log.level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[ui\nsave_indicator_ms = ").unwrap();
        assert!(matches!(
            read_config(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_store_path_precedence() {
        let mut config = AppConfig::default();
        config.storage.path = Some(PathBuf::from("/from/config.json"));

        assert_eq!(
            resolve_store_path(&config, Some(Path::new("/from/flag.json"))),
            PathBuf::from("/from/flag.json")
        );
        assert_eq!(
            resolve_store_path(&config, None),
            PathBuf::from("/from/config.json")
        );
        config.storage.path = None;
        assert!(resolve_store_path(&config, None).ends_with("exectasks/storage.json"));
    }
}
