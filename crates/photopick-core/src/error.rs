//! Error types for the Photopick pipeline.
//!
//! Errors are organized by concern (host configuration, request options,
//! pipeline stages, external capabilities). Every error that can end a
//! request maps to exactly one [`ErrorKind`], whose string code is what the
//! host binding sees.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::platform::Permission;

/// Stable rejection codes delivered to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ActivityNull,
    CameraNotAvailable,
    CameraPermission,
    LibraryPermission,
    PermissionDenied,
    Cancelled,
    FileNotFound,
    Decode,
    FileAccess,
    RuntimePermission,
    Crop,
    Save,
    AlreadyInProgress,
    InvalidOptions,
    PickerLaunch,
    CaptureFailed,
    ImageFile,
    Unknown,
}

impl ErrorKind {
    /// The code string handed to the host binding.
    pub fn code(self) -> &'static str {
        match self {
            Self::ActivityNull => "ACTIVITY_NULL",
            Self::CameraNotAvailable => "CAMERA_NOT_AVAILABLE",
            Self::CameraPermission => "CAMERA_PERMISSION_ERROR",
            Self::LibraryPermission => "LIBRARY_PERMISSION_ERROR",
            Self::PermissionDenied => "NO_LIBRARY_PERMISSION_ERROR",
            Self::Cancelled => "PICKER_CANCELLED_ERROR",
            Self::FileNotFound => "FILE_NOT_FOUND",
            Self::Decode => "DECODE_ERROR",
            Self::FileAccess => "FILE_ACCESS_ERROR",
            Self::RuntimePermission => "PERMISSION_ERROR",
            Self::Crop => "IMAGE_CROP_ERROR",
            Self::Save => "IMAGE_SAVE_ERROR",
            Self::AlreadyInProgress => "ALREADY_IN_PROGRESS_ERROR",
            Self::InvalidOptions => "INVALID_OPTIONS_ERROR",
            Self::PickerLaunch => "IMAGE_PICKER_ERROR",
            Self::CaptureFailed => "IMAGE_CAPTURE_ERROR",
            Self::ImageFile => "IMAGE_FILE_ERROR",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The `(code, message)` pair a request is rejected with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub kind: ErrorKind,
    pub message: String,
}

impl Rejection {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// True for user dismissal of any surface.
    pub fn is_cancellation(&self) -> bool {
        self.kind == ErrorKind::Cancelled
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message)
    }
}

impl std::error::Error for Rejection {}

/// A UI surface the user can dismiss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Gallery,
    Camera,
    Cropper,
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gallery => f.write_str("Image picker"),
            Self::Camera => f.write_str("Image capture"),
            Self::Cropper => f.write_str("Image cropping"),
        }
    }
}

/// Top-level error for a picker request.
#[derive(Error, Debug)]
pub enum PickerError {
    /// No foreground surface to present UI on
    #[error("Activity is null")]
    ActivityNull,

    #[error("Camera is not available on this device")]
    CameraNotAvailable,

    #[error("User did not grant {permission} permission")]
    PermissionDenied { permission: Permission },

    /// The user dismissed a surface
    #[error("{surface} cancelled")]
    Cancelled { surface: Surface },

    /// Another request still holds the pending slot
    #[error("Another image request (#{active}) is still in progress")]
    AlreadyInProgress { active: u64 },

    #[error(transparent)]
    Options(#[from] OptionsError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Capability(#[from] CapabilityError),

    /// The camera destination file could not be prepared
    #[error("Failed to create image file {path}: {source}")]
    CaptureDestination {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Image cropping failed: {0}")]
    Crop(String),
}

impl PickerError {
    /// Classify this error into its rejection code.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ActivityNull => ErrorKind::ActivityNull,
            Self::CameraNotAvailable => ErrorKind::CameraNotAvailable,
            Self::PermissionDenied { permission } => match permission {
                Permission::Camera => ErrorKind::CameraPermission,
                Permission::Storage | Permission::PhotoLibrary => ErrorKind::LibraryPermission,
                Permission::Other(_) => ErrorKind::PermissionDenied,
            },
            Self::Cancelled { .. } => ErrorKind::Cancelled,
            Self::AlreadyInProgress { .. } => ErrorKind::AlreadyInProgress,
            Self::Options(_) => ErrorKind::InvalidOptions,
            Self::Pipeline(e) => e.kind(),
            Self::Capability(e) => e.kind(),
            Self::CaptureDestination { .. } => ErrorKind::ImageFile,
            Self::Crop(_) => ErrorKind::Crop,
        }
    }

    /// Map a failure reported by a crop surface.
    ///
    /// Decode and file errors raised while the cropper loads the image keep
    /// their own classification; everything else is a crop failure.
    pub fn from_crop(error: CapabilityError) -> Self {
        match error {
            CapabilityError::Pipeline(e) => Self::Pipeline(e),
            other => Self::Crop(other.to_string()),
        }
    }

    /// Convert into the host-facing rejection pair.
    pub fn into_rejection(self) -> Rejection {
        Rejection::new(self.kind(), self.to_string())
    }
}

/// Host configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Per-request option errors.
#[derive(Error, Debug)]
pub enum OptionsError {
    /// The option map could not be read
    #[error("Malformed picker options: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Values are out of range
    #[error("Invalid picker options: {0}")]
    Invalid(String),
}

/// Pipeline stage errors.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to access image file {path}: {message}")]
    FileAccess { path: PathBuf, message: String },

    #[error("Permission denied to access image file {path}: {message}")]
    ReadPermission { path: PathBuf, message: String },

    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    #[error("Failed to decode {path}: {message}")]
    Decode { path: PathBuf, message: String },

    #[error("Unsupported format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    #[error("Image too large: {path} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    #[error("Timeout in {stage} stage for {path} after {timeout_ms}ms")]
    Timeout {
        path: PathBuf,
        stage: String,
        timeout_ms: u64,
    },

    #[error("Invalid target dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Failed to encode {format}: {message}")]
    Encode { format: String, message: String },

    #[error("Image could not be saved to {path}: {message}")]
    Save { path: PathBuf, message: String },

    /// A blocking worker panicked or was cancelled
    #[error("{stage} worker failed: {message}")]
    Worker { stage: String, message: String },
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FileNotFound(_) => ErrorKind::FileNotFound,
            Self::FileAccess { .. } => ErrorKind::FileAccess,
            Self::ReadPermission { .. } => ErrorKind::RuntimePermission,
            Self::Decode { .. }
            | Self::FileTooLarge { .. }
            | Self::UnsupportedFormat { .. }
            | Self::ImageTooLarge { .. }
            | Self::Timeout { .. } => ErrorKind::Decode,
            Self::Encode { .. } | Self::Save { .. } => ErrorKind::Save,
            Self::InvalidDimensions { .. } | Self::Worker { .. } => ErrorKind::Unknown,
        }
    }

    /// Classify an I/O error raised while reading an acquired file.
    pub fn from_read(path: &std::path::Path, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::FileNotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::ReadPermission {
                path: path.to_path_buf(),
                message: error.to_string(),
            },
            _ => Self::FileAccess {
                path: path.to_path_buf(),
                message: error.to_string(),
            },
        }
    }
}

/// Failures reported by external collaborators (picker, camera, cropper,
/// permission API).
#[derive(Error, Debug)]
pub enum CapabilityError {
    #[error("Failed to show image picker: {0}")]
    PickerUnavailable(String),

    #[error("Image capture failed: {0}")]
    CaptureFailed(String),

    #[error("Crop surface failed: {0}")]
    CropFailed(String),

    #[error("Permission query failed: {0}")]
    Permission(String),

    /// The surface went away without ever completing
    #[error("{surface} finished without reporting a result")]
    Disconnected { surface: String },

    /// A pipeline stage run on behalf of a capability failed
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("{0}")]
    Other(String),
}

impl CapabilityError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PickerUnavailable(_) => ErrorKind::PickerLaunch,
            Self::CaptureFailed(_) => ErrorKind::CaptureFailed,
            Self::CropFailed(_) => ErrorKind::Crop,
            Self::Pipeline(e) => e.kind(),
            Self::Permission(_) | Self::Disconnected { .. } | Self::Other(_) => {
                ErrorKind::Unknown
            }
        }
    }
}

/// Convenience type alias for picker results.
pub type Result<T> = std::result::Result<T, PickerError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_is_uniform() {
        for surface in [Surface::Gallery, Surface::Camera, Surface::Cropper] {
            let rejection = PickerError::Cancelled { surface }.into_rejection();
            assert_eq!(rejection.code(), "PICKER_CANCELLED_ERROR");
            assert!(rejection.is_cancellation());
        }
    }

    #[test]
    fn test_permission_denial_codes() {
        let camera = PickerError::PermissionDenied {
            permission: Permission::Camera,
        };
        assert_eq!(camera.kind().code(), "CAMERA_PERMISSION_ERROR");

        let storage = PickerError::PermissionDenied {
            permission: Permission::Storage,
        };
        assert_eq!(storage.kind().code(), "LIBRARY_PERMISSION_ERROR");

        let other = PickerError::PermissionDenied {
            permission: Permission::Other("android.permission.ACCESS_MEDIA_LOCATION".into()),
        };
        assert_eq!(other.kind(), ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_read_errors_are_classified() {
        let path = std::path::Path::new("/tmp/a.jpg");
        let not_found = std::io::Error::from(std::io::ErrorKind::NotFound);
        assert_eq!(
            PipelineError::from_read(path, not_found).kind(),
            ErrorKind::FileNotFound
        );

        let denied = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        assert_eq!(
            PipelineError::from_read(path, denied).kind(),
            ErrorKind::RuntimePermission
        );

        let other = std::io::Error::other("device busy");
        assert_eq!(
            PipelineError::from_read(path, other).kind(),
            ErrorKind::FileAccess
        );
    }

    #[test]
    fn test_crop_errors_keep_decode_classification() {
        let decode = CapabilityError::Pipeline(PipelineError::Decode {
            path: PathBuf::from("x.jpg"),
            message: "truncated".into(),
        });
        assert_eq!(PickerError::from_crop(decode).kind(), ErrorKind::Decode);

        let surface = CapabilityError::Other("widget crashed".into());
        assert_eq!(PickerError::from_crop(surface).kind(), ErrorKind::Crop);
    }

    #[test]
    fn test_unknown_error_keeps_message() {
        let err = PickerError::Capability(CapabilityError::Other("boom".into()));
        let rejection = err.into_rejection();
        assert_eq!(rejection.code(), "UNKNOWN_ERROR");
        assert!(rejection.message.contains("boom"));
    }
}
