//! Filesystem-backed platform capabilities for the desktop host.
//!
//! The "gallery" hands back a file given on the command line and the
//! "camera" copies one into the capture destination, so the full request
//! lifecycle runs without any platform UI.

use std::collections::HashSet;
use std::path::PathBuf;

use async_trait::async_trait;
use photopick_core::{
    Camera, CapabilityError, CaptureRequest, CapturedPhoto, GalleryPicker, GalleryRequest, Host,
    Outcome, Permission, PermissionProvider, PermissionStatus, RawImageHandle,
};

/// A terminal session always has somewhere to present.
pub struct DesktopHost;

impl Host for DesktopHost {
    fn is_attached(&self) -> bool {
        true
    }
}

/// Grants everything except the permissions the user chose to deny.
pub struct DesktopPermissions {
    denied: HashSet<Permission>,
}

impl DesktopPermissions {
    pub fn new(denied: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            denied: denied.into_iter().collect(),
        }
    }

    fn status(&self, permission: &Permission) -> PermissionStatus {
        if self.denied.contains(permission) {
            PermissionStatus::Denied
        } else {
            PermissionStatus::Granted
        }
    }
}

#[async_trait]
impl PermissionProvider for DesktopPermissions {
    fn check(&self, permission: &Permission) -> PermissionStatus {
        self.status(permission)
    }

    async fn request(
        &self,
        permissions: &[Permission],
    ) -> Result<Vec<(Permission, PermissionStatus)>, CapabilityError> {
        Ok(permissions
            .iter()
            .map(|p| {
                let status = self.status(p);
                tracing::debug!("Permission {} -> {:?}", p, status);
                (p.clone(), status)
            })
            .collect())
    }
}

/// Parse a `--deny` value.
pub fn parse_permission(value: &str) -> Result<Permission, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" => Err("permission name must not be empty".to_string()),
        "camera" => Ok(Permission::Camera),
        "storage" => Ok(Permission::Storage),
        "photo-library" | "photos" | "library" => Ok(Permission::PhotoLibrary),
        _ => Ok(Permission::Other(value.trim().to_string())),
    }
}

/// Gallery whose selection is a file chosen up front.
pub struct FileGallery {
    source: PathBuf,
}

impl FileGallery {
    pub fn new(source: PathBuf) -> Self {
        Self { source }
    }
}

#[async_trait]
impl GalleryPicker for FileGallery {
    async fn pick(
        &self,
        request: &GalleryRequest,
    ) -> Result<Outcome<RawImageHandle>, CapabilityError> {
        tracing::debug!(
            "Gallery ({:?}, {:?}) -> {:?}",
            request.surface,
            request.mime_types,
            self.source
        );
        Ok(Outcome::Completed(RawImageHandle::from_path(&self.source)))
    }
}

/// Camera whose "shot" is a copy of an existing file.
pub struct FileCamera {
    source: PathBuf,
}

impl FileCamera {
    pub fn new(source: PathBuf) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Camera for FileCamera {
    fn is_available(&self) -> bool {
        true
    }

    async fn capture(
        &self,
        request: &CaptureRequest,
    ) -> Result<Outcome<CapturedPhoto>, CapabilityError> {
        tracing::debug!(
            "Capture ({:?} camera) {:?} -> {:?}",
            request.facing,
            self.source,
            request.destination
        );
        tokio::fs::copy(&self.source, &request.destination)
            .await
            .map_err(|e| {
                CapabilityError::CaptureFailed(format!("{}: {}", self.source.display(), e))
            })?;
        Ok(Outcome::Completed(CapturedPhoto::default()))
    }
}
