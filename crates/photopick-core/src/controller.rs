//! Request lifecycle controller.
//!
//! Binds acquisition, the optional crop sub-flow and the compute stages into
//! one awaited request. Only one request may be pending: a call made while
//! another is in flight is rejected with `ALREADY_IN_PROGRESS_ERROR` and
//! never touches the pending request's state.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

use crate::acquire::AcquisitionGate;
use crate::capability::{
    Camera, CropRequest, Cropper, GalleryPicker, Host, Outcome, PermissionProvider,
};
use crate::config::Config;
use crate::crop::{CropRouter, CropSurface, InProcessCropper};
use crate::error::{
    ErrorKind, PickerError, PipelineError, PipelineResult, Rejection, Result, Surface,
};
use crate::options::PickerOptions;
use crate::pipeline::{normalize, ImageProcessor, RenderPlan};
use crate::platform::SourceKind;
use crate::types::{PickedImage, PixelBuffer, RawImageHandle};

/// Where the pending request currently is. States only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecycleState {
    Idle,
    PermissionPending,
    Acquiring,
    Cropping,
    Normalizing,
    Transforming,
    Encoding,
    Settled,
}

/// Identity of one `open` call, used in logs and to release the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

impl RequestId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The platform collaborators a controller drives.
pub struct Capabilities {
    host: Arc<dyn Host>,
    permissions: Arc<dyn PermissionProvider>,
    gallery: Arc<dyn GalleryPicker>,
    camera: Option<Arc<dyn Camera>>,
    native_cropper: Option<Arc<dyn Cropper>>,
    crop_surface: Option<Arc<dyn CropSurface>>,
}

impl Capabilities {
    /// `camera` is `None` on devices without one.
    pub fn new(
        host: Arc<dyn Host>,
        permissions: Arc<dyn PermissionProvider>,
        gallery: Arc<dyn GalleryPicker>,
        camera: Option<Arc<dyn Camera>>,
    ) -> Self {
        Self {
            host,
            permissions,
            gallery,
            camera,
            native_cropper: None,
            crop_surface: None,
        }
    }

    /// Register the platform's own crop widget.
    pub fn with_native_cropper(mut self, cropper: Arc<dyn Cropper>) -> Self {
        self.native_cropper = Some(cropper);
        self
    }

    /// Register a selection UI for the in-process cropper.
    pub fn with_crop_surface(mut self, surface: Arc<dyn CropSurface>) -> Self {
        self.crop_surface = Some(surface);
        self
    }
}

/// Drives picker requests, one at a time.
pub struct PickerController {
    config: Config,
    host: Arc<dyn Host>,
    gate: AcquisitionGate,
    crop: CropRouter,
    processor: Arc<ImageProcessor>,
    active: AtomicU64,
    next_id: AtomicU64,
    state: watch::Sender<LifecycleState>,
}

/// The claimed pending-request slot. Releasing it returns the controller
/// to `Idle`.
struct Slot<'a> {
    controller: &'a PickerController,
    id: RequestId,
}

impl Drop for Slot<'_> {
    fn drop(&mut self) {
        self.controller.state.send_replace(LifecycleState::Idle);
        let _ = self.controller.active.compare_exchange(
            self.id.0,
            0,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }
}

impl PickerController {
    pub fn new(config: Config, capabilities: Capabilities) -> Self {
        let processor = Arc::new(ImageProcessor::new(&config));
        let in_process = capabilities.crop_surface.map(|surface| {
            Arc::new(InProcessCropper::new(surface, Arc::clone(&processor))) as Arc<dyn Cropper>
        });
        let gate = AcquisitionGate::new(
            config.platform.tier,
            capabilities.permissions,
            capabilities.gallery,
            capabilities.camera,
            config.temp_dir(),
        );
        tracing::debug!(
            "Picker controller ready (tier: {:?}, native cropper: {}, in-process cropper: {})",
            config.platform.tier,
            capabilities.native_cropper.is_some(),
            in_process.is_some()
        );

        let (state, _) = watch::channel(LifecycleState::Idle);
        Self {
            crop: CropRouter::new(capabilities.native_cropper, in_process),
            host: capabilities.host,
            config,
            gate,
            processor,
            active: AtomicU64::new(0),
            next_id: AtomicU64::new(1),
            state,
        }
    }

    /// Current lifecycle state of the pending request.
    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    /// The pending request, if any.
    pub fn active_request(&self) -> Option<RequestId> {
        match self.active.load(Ordering::Acquire) {
            0 => None,
            id => Some(RequestId(id)),
        }
    }

    pub async fn open_gallery(
        &self,
        options: &serde_json::Value,
    ) -> std::result::Result<PickedImage, Rejection> {
        self.open(SourceKind::Gallery, options).await
    }

    pub async fn open_camera(
        &self,
        options: &serde_json::Value,
    ) -> std::result::Result<PickedImage, Rejection> {
        self.open(SourceKind::Camera, options).await
    }

    /// Run one request to settlement.
    pub async fn open(
        &self,
        kind: SourceKind,
        options: &serde_json::Value,
    ) -> std::result::Result<PickedImage, Rejection> {
        let id = RequestId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let result = match self.claim(id) {
            Ok(slot) => {
                let result = self.run(id, kind, options).await;
                self.advance(id, LifecycleState::Settled);
                drop(slot);
                result
            }
            Err(e) => Err(e),
        };

        match &result {
            Ok(picked) => tracing::info!(
                "Request {} settled: {} ({}x{}, {} bytes)",
                id,
                picked.uri,
                picked.width,
                picked.height,
                picked.file_size
            ),
            Err(e) if e.kind() == ErrorKind::Cancelled => {
                tracing::info!("Request {} settled: {}", id, e)
            }
            Err(e) => tracing::warn!("Request {} rejected: {} ({})", id, e, e.kind()),
        }
        result.map_err(PickerError::into_rejection)
    }

    fn claim(&self, id: RequestId) -> Result<Slot<'_>> {
        match self
            .active
            .compare_exchange(0, id.0, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => Ok(Slot {
                controller: self,
                id,
            }),
            Err(active) => Err(PickerError::AlreadyInProgress { active }),
        }
    }

    fn advance(&self, id: RequestId, next: LifecycleState) {
        let previous = self.state.send_replace(next);
        debug_assert!(previous < next, "{previous:?} -> {next:?}");
        tracing::debug!("Request {}: {:?} -> {:?}", id, previous, next);
    }

    async fn run(
        &self,
        id: RequestId,
        kind: SourceKind,
        options: &serde_json::Value,
    ) -> Result<PickedImage> {
        if !self.host.is_attached() {
            return Err(PickerError::ActivityNull);
        }
        let options = PickerOptions::from_value(options, &self.config.platform)?;
        tracing::debug!("Request {} ({}) options: {:?}", id, kind, options);
        if kind == SourceKind::Camera {
            self.gate.ensure_camera()?;
        }

        self.advance(id, LifecycleState::PermissionPending);
        self.gate.authorize(kind).await?;

        self.advance(id, LifecycleState::Acquiring);
        let handle = self.gate.invoke(kind, &options).await?;
        tracing::debug!("Request {} acquired {}", id, handle.uri());

        let result = self.process(id, &handle, &options).await;
        if handle.staged {
            self.processor.discard(&handle.path);
        }
        result
    }

    /// Everything after acquisition: crop, normalize, transform, encode.
    async fn process(
        &self,
        id: RequestId,
        handle: &RawImageHandle,
        options: &PickerOptions,
    ) -> Result<PickedImage> {
        let cropper = if options.is_cropping {
            self.crop.route(options.use_native_cropper)
        } else {
            None
        };

        let upright = match cropper {
            Some(cropper) => {
                self.advance(id, LifecycleState::Cropping);
                let request = CropRequest {
                    source: handle.clone(),
                    aspect: options.target(),
                    target: options.target(),
                    mask: options.crop_mask(),
                };
                let cropped = match cropper.crop(request).await {
                    Ok(Outcome::Completed(pixels)) => pixels,
                    Ok(Outcome::Cancelled) => {
                        return Err(PickerError::Cancelled {
                            surface: Surface::Cropper,
                        })
                    }
                    Err(e) => return Err(PickerError::from_crop(e)),
                };
                // Croppers hand back upright pixels
                self.advance(id, LifecycleState::Normalizing);
                cropped
            }
            None => {
                if options.is_cropping {
                    tracing::warn!("No crop surface registered; shaping with aspect-fill only");
                }
                self.advance(id, LifecycleState::Normalizing);
                let oriented = self.processor.load(handle).await?;
                blocking("normalize", move || Ok(normalize(oriented))).await?
            }
        };

        let plan = RenderPlan {
            target: (options.is_cropping || options.should_resize).then(|| options.target()),
            format: options.output_format(),
            quality: options.compression_quality,
            is_temp: options.is_temp,
        };

        self.advance(id, LifecycleState::Transforming);
        let processor = Arc::clone(&self.processor);
        let shaped: PixelBuffer =
            blocking("transform", move || processor.shape(upright, &plan)).await?;

        self.advance(id, LifecycleState::Encoding);
        let processor = Arc::clone(&self.processor);
        blocking("encode", move || processor.persist(&shaped, &plan)).await
    }
}

/// Run a compute stage on a blocking worker.
async fn blocking<T, F>(stage: &'static str, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> PipelineResult<T> + Send + 'static,
{
    let result = tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| PipelineError::Worker {
            stage: stage.to_string(),
            message: e.to_string(),
        })?;
    Ok(result?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_states_are_ordered() {
        use LifecycleState::*;
        let order = [
            Idle,
            PermissionPending,
            Acquiring,
            Cropping,
            Normalizing,
            Transforming,
            Encoding,
            Settled,
        ];
        assert!(order.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_request_id_display() {
        assert_eq!(RequestId(7).to_string(), "#7");
        assert_eq!(RequestId(7).get(), 7);
    }
}
