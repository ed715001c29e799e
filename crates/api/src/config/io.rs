//! Configuration IO helpers.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use dirs_next::{config_dir, home_dir};
use tracing::debug;

use crate::config::{ApiConfig, ConfigError, validate_config};

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "CONTACTS_CONFIG_PATH";

/// Returns the default path for the API configuration file.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV)
        && !path.trim().is_empty()
    {
        return expand_tilde(&path);
    }

    config_dir().unwrap_or_else(|| PathBuf::from(".")).join("contacts").join("api.json")
}

/// Loads and validates configuration from the default path.
pub fn load_config() -> Result<ApiConfig, ConfigError> {
    load_config_from_path(&default_config_path())
}

/// Loads and validates configuration from a specific path.
///
/// A missing file yields the defaults.
pub fn load_config_from_path(path: &Path) -> Result<ApiConfig, ConfigError> {
    let config = if path.exists() {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)?
    } else {
        debug!(path = %path.display(), "configuration file not found, using defaults");
        ApiConfig::default()
    };
    validate_config(&config)?;
    Ok(config)
}

fn expand_tilde(path: &str) -> PathBuf {
    let trimmed = path.trim();
    if trimmed == "~" {
        return home_dir().unwrap_or_else(|| PathBuf::from("~"));
    }
    if let Some(rest) = trimmed.strip_prefix("~/") {
        return home_dir().unwrap_or_else(|| PathBuf::from("~")).join(rest);
    }
    PathBuf::from(trimmed)
}
