//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::platform::CapabilityTier;

/// Platform capability settings and the platform-dependent option defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Capability tier, resolved once when the controller is built
    pub tier: CapabilityTier,

    /// Default for `useFrontCamera`
    pub front_camera_default: bool,

    /// Default for `isCropCircular`
    pub crop_circular_default: bool,

    /// Default for `isTemp`
    pub temp_default: bool,

    /// Default for `useNativeCropper`
    pub native_cropper_default: bool,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            tier: CapabilityTier::default(),
            front_camera_default: true,
            crop_circular_default: true,
            temp_default: true,
            native_cropper_default: true,
        }
    }
}

/// Output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Application name, used for the persistent media sub-directory
    pub app_name: String,

    /// Directory for `isTemp` outputs and camera staging files.
    /// Defaults to `<os temp>/<app_name>`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<PathBuf>,

    /// Directory for persistent outputs.
    /// Defaults to `<user pictures>/<app_name>`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_dir: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            app_name: "photopick".to_string(),
            temp_dir: None,
            media_dir: None,
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum acquired file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum decoded image dimension (width or height)
    pub max_image_dimension: u32,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 100,
            max_image_dimension: 16384,
            decode_timeout_ms: 10000,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
