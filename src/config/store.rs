//! Configuration Storage
//!
//! Persist settings to disk.

use super::{Settings, SettingsError};
use std::path::{Path, PathBuf};

/// Get the configuration directory path
pub fn config_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "autominutes", "Autominutes")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| {
            // Fallback to current directory
            std::env::current_dir().unwrap_or_default().join("config")
        })
}

/// Get the configuration file path
pub fn config_file() -> PathBuf {
    config_dir().join("settings.toml")
}

/// Load settings from disk
pub fn load_settings() -> Result<Settings, SettingsError> {
    let path = config_file();

    if !path.exists() {
        tracing::info!("No settings file found, using defaults");
        return Ok(Settings::default());
    }

    load_settings_from(&path)
}

/// Load settings from an explicit path; a missing file is an error here
pub fn load_settings_from(path: &Path) -> Result<Settings, SettingsError> {
    let content = std::fs::read_to_string(path)?;
    let settings: Settings = toml::from_str(&content)?;

    tracing::info!("Settings loaded from {:?}", path);
    Ok(settings)
}

/// Save settings to disk
pub fn save_settings(settings: &Settings) -> Result<(), SettingsError> {
    let path = config_file();

    // Ensure config directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = toml::to_string_pretty(settings)?;
    std::fs::write(&path, content)?;

    tracing::info!("Settings saved to {:?}", path);
    Ok(())
}
