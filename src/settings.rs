//! Update settings persistence
//!
//! Saves and loads the user's update preferences to/from disk

use crate::channel::Channel;
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const SETTINGS_FILE: &str = "update-settings.json";
const APP_NAME: &str = "Runehall";

/// User preferences for the updater
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSettings {
    /// Preferred update channel; `none` means ask on the next manual check
    #[serde(default)]
    pub channel: Channel,
    /// Check for updates automatically on startup
    #[serde(default = "default_auto_check")]
    pub auto_check: bool,
    /// Last time a check ran (Unix timestamp)
    #[serde(default)]
    pub last_check: Option<i64>,
    /// Version the user dismissed; don't prompt for it again
    #[serde(default)]
    pub dismissed_version: Option<String>,
}

fn default_auto_check() -> bool {
    true
}

impl Default for UpdateSettings {
    fn default() -> Self {
        Self {
            channel: Channel::None,
            auto_check: true,
            last_check: None,
            dismissed_version: None,
        }
    }
}

fn get_settings_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME))
}

fn get_settings_path() -> Option<PathBuf> {
    get_settings_dir().map(|dir| dir.join(SETTINGS_FILE))
}

/// Load settings from the default location, falling back to defaults on any
/// problem so a corrupt file never blocks startup.
pub fn load_settings() -> UpdateSettings {
    let path = match get_settings_path() {
        Some(path) => path,
        None => {
            debug!("Could not determine settings path, using defaults");
            return UpdateSettings::default();
        }
    };
    load_settings_from(&path)
}

pub fn load_settings_from(path: &Path) -> UpdateSettings {
    if !path.exists() {
        debug!("Settings file does not exist, using defaults");
        return UpdateSettings::default();
    }

    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(settings) => {
                info!("Loaded update settings from {:?}", path);
                settings
            }
            Err(e) => {
                error!("Failed to parse settings file: {}", e);
                UpdateSettings::default()
            }
        },
        Err(e) => {
            error!("Failed to read settings file: {}", e);
            UpdateSettings::default()
        }
    }
}

/// Save settings to the default location
pub fn save_settings(settings: &UpdateSettings) -> Result<(), String> {
    let dir = match get_settings_dir() {
        Some(dir) => dir,
        None => return Err("Could not determine settings directory".to_string()),
    };
    save_settings_to(settings, &dir)
}

pub fn save_settings_to(settings: &UpdateSettings, dir: &Path) -> Result<(), String> {
    if !dir.exists() {
        if let Err(e) = fs::create_dir_all(dir) {
            return Err(format!("Failed to create settings directory: {}", e));
        }
    }

    let path = dir.join(SETTINGS_FILE);

    let json = match serde_json::to_string_pretty(settings) {
        Ok(json) => json,
        Err(e) => return Err(format!("Failed to serialize settings: {}", e)),
    };

    match fs::write(&path, json) {
        Ok(_) => {
            info!("Saved update settings to {:?}", path);
            Ok(())
        }
        Err(e) => Err(format!("Failed to write settings file: {}", e)),
    }
}
