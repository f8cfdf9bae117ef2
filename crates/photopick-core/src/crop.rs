//! Interactive crop sub-flow.
//!
//! A request with `isCropping` hands the acquired image to a [`Cropper`].
//! Platforms with a native crop widget register it directly; everywhere
//! else [`InProcessCropper`] decodes and normalizes the image itself and
//! asks a [`CropSurface`] only for the selection rectangle.

use async_trait::async_trait;
use std::sync::Arc;

use crate::capability::{CropMask, CropRequest, Cropper, Outcome};
use crate::error::{CapabilityError, PipelineError};
use crate::pipeline::{normalize, ImageProcessor};
use crate::types::PixelBuffer;

/// Picks the cropper for a request.
#[derive(Clone, Default)]
pub struct CropRouter {
    native: Option<Arc<dyn Cropper>>,
    in_process: Option<Arc<dyn Cropper>>,
}

impl CropRouter {
    pub fn new(native: Option<Arc<dyn Cropper>>, in_process: Option<Arc<dyn Cropper>>) -> Self {
        Self { native, in_process }
    }

    /// The cropper to use, or `None` when no crop surface exists at all.
    ///
    /// `use_native` prefers the native widget; either way the other
    /// cropper stands in when the preferred one is not registered.
    pub fn route(&self, use_native: bool) -> Option<&Arc<dyn Cropper>> {
        let preferred = if use_native {
            self.native.as_ref()
        } else {
            self.in_process.as_ref()
        };
        preferred.or(self.in_process.as_ref()).or(self.native.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.native.is_none() && self.in_process.is_none()
    }
}

/// What a crop surface is asked to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropPreview {
    /// Upright image width
    pub width: u32,
    /// Upright image height
    pub height: u32,
    /// Locked aspect ratio, as `(width, height)`
    pub aspect: (u32, u32),
    /// Preview mask; the output is always rectangular
    pub mask: CropMask,
}

/// A selection in upright pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Where a locked-aspect selection sits along the free axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CropAnchor {
    /// Top or left edge
    Start,
    #[default]
    Center,
    /// Bottom or right edge
    End,
}

impl CropRect {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// The largest rectangle of `aspect` that fits the image, placed at
    /// `anchor` along the axis with room to spare.
    pub fn anchored(image: (u32, u32), aspect: (u32, u32), anchor: CropAnchor) -> Self {
        let (width, height) = fit_aspect(image.0, image.1, aspect);
        let offset = |room: u32| match anchor {
            CropAnchor::Start => 0,
            CropAnchor::Center => room / 2,
            CropAnchor::End => room,
        };
        Self {
            x: offset(image.0 - width),
            y: offset(image.1 - height),
            width,
            height,
        }
    }

    /// Clamp to the image, then shrink to `aspect` around the selection's
    /// centre.
    pub fn lock_aspect(self, image: (u32, u32), aspect: (u32, u32)) -> Self {
        let x = self.x.min(image.0.saturating_sub(1));
        let y = self.y.min(image.1.saturating_sub(1));
        let width = self.width.clamp(1, image.0 - x);
        let height = self.height.clamp(1, image.1 - y);

        let (locked_w, locked_h) = fit_aspect(width, height, aspect);
        Self {
            x: x + (width - locked_w) / 2,
            y: y + (height - locked_h) / 2,
            width: locked_w,
            height: locked_h,
        }
    }
}

/// Largest `(w, h)` with ratio `aspect` inside `width x height`, at least
/// one pixel on each side.
fn fit_aspect(width: u32, height: u32, aspect: (u32, u32)) -> (u32, u32) {
    let (aw, ah) = (aspect.0.max(1) as u64, aspect.1.max(1) as u64);
    let (w, h) = (width as u64, height as u64);
    if w * ah > h * aw {
        let fitted = ((h * aw) as f64 / ah as f64).round() as u64;
        (fitted.clamp(1, w) as u32, height)
    } else {
        let fitted = ((w * ah) as f64 / aw as f64).round() as u64;
        (width, fitted.clamp(1, h) as u32)
    }
}

/// A UI that lets the user choose the crop region.
#[async_trait]
pub trait CropSurface: Send + Sync {
    /// Ask for a selection. Selections that break the aspect lock are
    /// snapped to it.
    async fn select(&self, preview: &CropPreview) -> Result<Outcome<CropRect>, CapabilityError>;
}

#[async_trait]
impl<S: CropSurface + ?Sized> CropSurface for Arc<S> {
    async fn select(&self, preview: &CropPreview) -> Result<Outcome<CropRect>, CapabilityError> {
        (**self).select(preview).await
    }
}

/// Cropper that does the pixel work in-process around a [`CropSurface`].
pub struct InProcessCropper<S> {
    surface: S,
    processor: Arc<ImageProcessor>,
}

impl<S: CropSurface> InProcessCropper<S> {
    pub fn new(surface: S, processor: Arc<ImageProcessor>) -> Self {
        Self { surface, processor }
    }
}

#[async_trait]
impl<S: CropSurface> Cropper for InProcessCropper<S> {
    async fn crop(&self, request: CropRequest) -> Result<Outcome<PixelBuffer>, CapabilityError> {
        let oriented = self.processor.load(&request.source).await?;
        let upright = tokio::task::spawn_blocking(move || normalize(oriented))
            .await
            .map_err(|e| PipelineError::Worker {
                stage: "crop normalize".to_string(),
                message: e.to_string(),
            })?;
        if upright.width() == 0 || upright.height() == 0 {
            return Err(PipelineError::InvalidDimensions {
                width: upright.width(),
                height: upright.height(),
            }
            .into());
        }

        let preview = CropPreview {
            width: upright.width(),
            height: upright.height(),
            aspect: request.aspect,
            mask: request.mask,
        };
        let selection = match self.surface.select(&preview).await? {
            Outcome::Completed(rect) => rect,
            Outcome::Cancelled => return Ok(Outcome::Cancelled),
        };

        let rect = selection.lock_aspect(upright.dimensions(), request.aspect);
        tracing::debug!(
            "Crop selection {:?} -> {}x{} at ({}, {})",
            selection,
            rect.width,
            rect.height,
            rect.x,
            rect.y
        );
        let cropped = upright
            .image()
            .crop_imm(rect.x, rect.y, rect.width, rect.height);
        Ok(Outcome::Completed(PixelBuffer::upright(cropped)))
    }
}
