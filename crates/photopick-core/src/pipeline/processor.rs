//! Pipeline orchestration - wires the compute stages together.
//!
//! Loading runs its decode on a blocking worker itself. The other stages are
//! synchronous and CPU or local-disk bound; the controller runs them on
//! blocking workers.

use std::path::Path;
use std::time::Instant;

use crate::config::Config;
use crate::error::PipelineResult;
use crate::types::{file_uri, OrientedImage, PickedImage, PixelBuffer, RawImageHandle};

use super::decode::{DecodedImage, ImageDecoder};
use super::encode::{encode, ImageStore, OutputFormat};
use super::orientation::Orientation;
use super::transform::aspect_fill;
use super::validate::Validator;

/// What to produce from upright pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderPlan {
    /// Exact output size, or `None` to keep the upright size
    pub target: Option<(u32, u32)>,
    pub format: OutputFormat,
    /// Quality on the `0.0..=1.0` scale
    pub quality: f32,
    pub is_temp: bool,
}

/// Runs the compute stages of a request.
pub struct ImageProcessor {
    decoder: ImageDecoder,
    validator: Validator,
    store: ImageStore,
}

impl ImageProcessor {
    /// Create a processor writing into the directories of `config`.
    pub fn new(config: &Config) -> Self {
        Self {
            decoder: ImageDecoder::new(config.limits.clone()),
            validator: Validator::new(config.limits.clone()),
            store: ImageStore::new(config.temp_dir(), config.media_dir()),
        }
    }

    /// Validate and decode an acquired file, keeping its orientation tag.
    ///
    /// The decode runs on a blocking worker bounded by the decode timeout.
    /// A source-reported orientation wins over the file's EXIF tag; with
    /// neither the pixels are taken as upright.
    pub async fn load(&self, handle: &RawImageHandle) -> PipelineResult<OrientedImage> {
        let start = Instant::now();
        self.validator.validate(&handle.path)?;
        let decoded = self
            .decoder
            .decode(&handle.path, handle.extension.as_deref())
            .await?;
        Ok(Self::orient(handle, decoded, start))
    }

    fn orient(handle: &RawImageHandle, decoded: DecodedImage, start: Instant) -> OrientedImage {
        let orientation = handle
            .orientation
            .or(decoded.exif_orientation)
            .unwrap_or(Orientation::Identity);
        tracing::trace!(
            "  Decode {:?}: {:?}, {} bytes, {:?} in {:?}",
            handle.path,
            decoded.format,
            decoded.file_size,
            orientation,
            start.elapsed()
        );
        OrientedImage {
            image: decoded.image,
            orientation,
        }
    }

    /// Apply the aspect-fill step of `plan`, if any.
    pub fn shape(&self, pixels: PixelBuffer, plan: &RenderPlan) -> PipelineResult<PixelBuffer> {
        match plan.target {
            Some((width, height)) => {
                let start = Instant::now();
                let shaped = aspect_fill(pixels, width, height)?;
                tracing::trace!("  Aspect-fill: {:?}", start.elapsed());
                Ok(shaped)
            }
            None => Ok(pixels),
        }
    }

    /// Encode `pixels` and write them to the directory chosen by `plan`.
    pub fn persist(&self, pixels: &PixelBuffer, plan: &RenderPlan) -> PipelineResult<PickedImage> {
        let start = Instant::now();
        let encoded = encode(pixels, plan.format, plan.quality)?;
        let path = self.store.persist(&encoded, plan.is_temp)?;
        tracing::trace!("  Encode + write: {:?}", start.elapsed());

        Ok(PickedImage {
            uri: file_uri(&path),
            file_size: encoded.bytes.len() as u64,
            path,
            width: encoded.width,
            height: encoded.height,
            format: encoded.format,
            quality: encoded.quality,
        })
    }

    /// Remove a staging file created for a capture.
    pub fn discard(&self, path: &Path) {
        if let Err(e) = std::fs::remove_file(path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to remove staging file {:?}: {}", path, e);
            }
        }
    }
}
