//! Host configuration for Photopick.
//!
//! Configuration is loaded from the platform config directory with defaults
//! for every key. It describes the host (capability tier, output directories,
//! limits, logging); per-request settings live in [`crate::PickerOptions`].

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Photopick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Platform capability settings
    pub platform: PlatformConfig,

    /// Output locations
    pub storage: StorageConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_or_default(&Self::default_path())
    }

    /// Load configuration from `path`, or defaults if it doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// - macOS: ~/Library/Application Support/com.photopick.photopick/config.toml
    /// - Linux: ~/.config/photopick/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\photopick\config\config.toml
    ///
    /// Falls back to ~/.photopick/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "photopick", "photopick")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".photopick").join("config.toml")
            })
    }

    /// Directory for temporary outputs and camera staging files.
    pub fn temp_dir(&self) -> PathBuf {
        match &self.storage.temp_dir {
            Some(dir) => expand(dir),
            None => std::env::temp_dir().join(&self.storage.app_name),
        }
    }

    /// Directory for persistent outputs.
    pub fn media_dir(&self) -> PathBuf {
        match &self.storage.media_dir {
            Some(dir) => expand(dir),
            None => directories::UserDirs::new()
                .and_then(|dirs| dirs.picture_dir().map(Path::to_path_buf))
                .or_else(|| {
                    directories::ProjectDirs::from("com", "photopick", "photopick")
                        .map(|dirs| dirs.data_dir().to_path_buf())
                })
                .unwrap_or_else(|| PathBuf::from("."))
                .join(&self.storage.app_name),
        }
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

/// Resolve `~` in a configured path.
fn expand(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&path_str).into_owned())
}
