//! Interfaces to the platform-owned collaborators.
//!
//! The permission dialog, gallery picker, camera and crop widget are owned by
//! the host platform. Each is modelled as an awaited capability that either
//! completes with a value, reports a user cancellation, or fails with a
//! [`CapabilityError`]. Platform adapters implement these traits; callback
//! based platforms bridge into them with [`crate::continuation`].
//!
//! Uses `async_trait` so the controller can hold `Arc<dyn ...>` objects.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::CapabilityError;
use crate::pipeline::orientation::Orientation;
use crate::platform::{GallerySurface, Permission};
use crate::types::{PixelBuffer, RawImageHandle};

/// Result of a user-facing surface: a value, or a dismissal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Completed(T),
    Cancelled,
}

impl<T> Outcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Completed(value) => Outcome::Completed(f(value)),
            Self::Cancelled => Outcome::Cancelled,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Grant state of a single permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// The host surface UI is presented on (an activity or view controller).
pub trait Host: Send + Sync {
    /// Whether a foreground surface exists right now.
    fn is_attached(&self) -> bool;
}

/// OS permission API.
#[async_trait]
pub trait PermissionProvider: Send + Sync {
    /// Current grant state, without prompting.
    fn check(&self, permission: &Permission) -> PermissionStatus;

    /// Prompt for `permissions` in one batch.
    ///
    /// Returns one status per requested permission, in request order.
    async fn request(
        &self,
        permissions: &[Permission],
    ) -> Result<Vec<(Permission, PermissionStatus)>, CapabilityError>;
}

/// What the gallery surface is asked to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryRequest {
    pub surface: GallerySurface,
    pub mime_types: Vec<String>,
    pub allow_multiple: bool,
}

impl GalleryRequest {
    /// Single-image selection restricted to image MIME types.
    pub fn single_image(surface: GallerySurface) -> Self {
        Self {
            surface,
            mime_types: vec!["image/*".to_string()],
            allow_multiple: false,
        }
    }
}

/// Gallery picker UI.
#[async_trait]
pub trait GalleryPicker: Send + Sync {
    async fn pick(
        &self,
        request: &GalleryRequest,
    ) -> Result<Outcome<RawImageHandle>, CapabilityError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraFacing {
    Front,
    Rear,
}

/// A capture the camera is asked to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequest {
    /// Pre-created file the camera writes the photo into
    pub destination: PathBuf,
    pub facing: CameraFacing,
}

/// Details the camera reports about a finished capture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedPhoto {
    /// Device-reported orientation, overriding the file's EXIF tag
    pub orientation: Option<Orientation>,
}

/// Camera capture UI.
#[async_trait]
pub trait Camera: Send + Sync {
    /// Whether the device has any usable camera.
    fn is_available(&self) -> bool;

    async fn capture(
        &self,
        request: &CaptureRequest,
    ) -> Result<Outcome<CapturedPhoto>, CapabilityError>;
}

/// How the crop region is previewed. The output raster is rectangular either
/// way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropMask {
    Rectangle,
    Circle,
}

/// Input to a crop surface.
#[derive(Debug, Clone)]
pub struct CropRequest {
    pub source: RawImageHandle,
    /// Locked aspect ratio as `(width, height)`
    pub aspect: (u32, u32),
    /// Requested output size, a hint for the surface
    pub target: (u32, u32),
    pub mask: CropMask,
}

/// Interactive crop UI.
///
/// Implementations return upright pixels: a native widget that leaves the
/// orientation tag in place must normalize before returning.
#[async_trait]
pub trait Cropper: Send + Sync {
    async fn crop(&self, request: CropRequest) -> Result<Outcome<PixelBuffer>, CapabilityError>;
}
