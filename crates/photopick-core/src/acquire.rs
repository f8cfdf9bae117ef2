//! Acquisition gate: permissions, then the gallery or camera surface.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::capability::{
    Camera, CaptureRequest, GalleryPicker, GalleryRequest, Outcome, PermissionProvider,
    PermissionStatus,
};
use crate::error::{PickerError, Result, Surface};
use crate::options::PickerOptions;
use crate::platform::{CapabilityTier, Permission, SourceKind};
use crate::types::RawImageHandle;

/// Guards access to the acquisition surfaces.
pub struct AcquisitionGate {
    tier: CapabilityTier,
    permissions: Arc<dyn PermissionProvider>,
    gallery: Arc<dyn GalleryPicker>,
    camera: Option<Arc<dyn Camera>>,
    staging_dir: PathBuf,
}

impl AcquisitionGate {
    pub fn new(
        tier: CapabilityTier,
        permissions: Arc<dyn PermissionProvider>,
        gallery: Arc<dyn GalleryPicker>,
        camera: Option<Arc<dyn Camera>>,
        staging_dir: PathBuf,
    ) -> Self {
        Self {
            tier,
            permissions,
            gallery,
            camera,
            staging_dir,
        }
    }

    /// The camera capability, if this device has a usable one.
    pub fn ensure_camera(&self) -> Result<&Arc<dyn Camera>> {
        match &self.camera {
            Some(camera) if camera.is_available() => Ok(camera),
            _ => Err(PickerError::CameraNotAvailable),
        }
    }

    /// Make sure every permission `kind` needs on this tier is granted.
    ///
    /// Only missing permissions are requested, in one batch. The first
    /// denial in request order decides the error.
    pub async fn authorize(&self, kind: SourceKind) -> Result<()> {
        let missing: Vec<Permission> = self
            .tier
            .required_permissions(kind)
            .into_iter()
            .filter(|p| self.permissions.check(p) != PermissionStatus::Granted)
            .collect();
        if missing.is_empty() {
            return Ok(());
        }

        tracing::debug!("Requesting permissions for {}: {:?}", kind, missing);
        let statuses = self.permissions.request(&missing).await?;
        for permission in missing {
            let granted = statuses
                .iter()
                .any(|(p, status)| *p == permission && *status == PermissionStatus::Granted);
            if !granted {
                return Err(PickerError::PermissionDenied { permission });
            }
        }
        Ok(())
    }

    /// Present the surface for `kind` and wait for the user.
    pub async fn invoke(&self, kind: SourceKind, options: &PickerOptions) -> Result<RawImageHandle> {
        match kind {
            SourceKind::Gallery => {
                let request = GalleryRequest::single_image(self.tier.gallery_surface());
                match self.gallery.pick(&request).await? {
                    Outcome::Completed(handle) => Ok(handle),
                    Outcome::Cancelled => Err(PickerError::Cancelled {
                        surface: Surface::Gallery,
                    }),
                }
            }
            SourceKind::Camera => {
                let camera = self.ensure_camera()?;
                let destination = self.create_destination()?;
                let request = CaptureRequest {
                    destination: destination.clone(),
                    facing: options.camera_facing(),
                };

                let outcome = match camera.capture(&request).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        remove_staged(&destination);
                        return Err(e.into());
                    }
                };
                match outcome {
                    Outcome::Completed(photo) => {
                        let mut handle = RawImageHandle::from_path(destination).staged();
                        handle.orientation = photo.orientation;
                        Ok(handle)
                    }
                    Outcome::Cancelled => {
                        remove_staged(&destination);
                        Err(PickerError::Cancelled {
                            surface: Surface::Camera,
                        })
                    }
                }
            }
        }
    }

    /// Create the empty file the camera writes into.
    fn create_destination(&self) -> Result<PathBuf> {
        let path = self
            .staging_dir
            .join(format!("capture-{}.jpg", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&self.staging_dir)
            .and_then(|()| {
                std::fs::OpenOptions::new()
                    .write(true)
                    .create_new(true)
                    .open(&path)
            })
            .map_err(|source| PickerError::CaptureDestination {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}

fn remove_staged(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("Failed to remove capture file {:?}: {}", path, e);
        }
    }
}
