//! Encoding and persistence of the final artifact.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, PipelineResult};
use crate::types::PixelBuffer;

/// Output codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    WebP,
    Jpeg,
}

impl OutputFormat {
    /// File extension including the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::WebP => ".webp",
            Self::Jpeg => ".jpg",
        }
    }
}

/// Map a `0.0..=1.0` quality to the codecs' native `0..=100` scale.
pub fn native_quality(quality: f32) -> u8 {
    (quality.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// An encoded image held in memory.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    /// Native quality parameter the encoder was configured with
    pub quality: u8,
    pub width: u32,
    pub height: u32,
}

/// Encode `pixels` as `format` at `quality` (`0.0..=1.0`).
///
/// JPEG honours the quality parameter (the codec's floor is 1). The WebP
/// codec of the `image` crate is lossless, so quality is recorded but does
/// not change the WebP bitstream.
pub fn encode(
    pixels: &PixelBuffer,
    format: OutputFormat,
    quality: f32,
) -> PipelineResult<EncodedImage> {
    let quality = native_quality(quality);
    let (width, height) = pixels.dimensions();
    let mut buffer = Cursor::new(Vec::new());

    let result = match format {
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgb8(pixels.image().to_rgb8());
            let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.max(1));
            rgb.write_with_encoder(encoder)
        }
        OutputFormat::WebP => {
            let rgba = DynamicImage::ImageRgba8(pixels.image().to_rgba8());
            rgba.write_to(&mut buffer, ImageFormat::WebP)
        }
    };
    result.map_err(|e| PipelineError::Encode {
        format: format!("{format:?}"),
        message: e.to_string(),
    })?;

    Ok(EncodedImage {
        bytes: buffer.into_inner(),
        format,
        quality,
        width,
        height,
    })
}

/// Writes encoded images under collision-free names.
#[derive(Debug, Clone)]
pub struct ImageStore {
    temp_dir: PathBuf,
    media_dir: PathBuf,
}

impl ImageStore {
    pub fn new(temp_dir: PathBuf, media_dir: PathBuf) -> Self {
        Self {
            temp_dir,
            media_dir,
        }
    }

    /// Target directory for a request.
    pub fn directory(&self, is_temp: bool) -> &Path {
        if is_temp {
            &self.temp_dir
        } else {
            &self.media_dir
        }
    }

    /// Write `encoded` to `image-<uuid><ext>` and return its path.
    pub fn persist(&self, encoded: &EncodedImage, is_temp: bool) -> PipelineResult<PathBuf> {
        let dir = self.directory(is_temp);
        std::fs::create_dir_all(dir).map_err(|e| PipelineError::Save {
            path: dir.to_path_buf(),
            message: format!("Cannot create directory: {}", e),
        })?;

        let file_name = format!("image-{}{}", uuid::Uuid::new_v4(), encoded.format.extension());
        let path = dir.join(file_name);

        // create_new refuses to clobber an existing file
        let write = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .and_then(|mut file| {
                file.write_all(&encoded.bytes)?;
                file.flush()
            });
        if let Err(e) = write {
            let _ = std::fs::remove_file(&path);
            return Err(PipelineError::Save {
                path,
                message: e.to_string(),
            });
        }

        tracing::debug!("Saved {} bytes to {:?}", encoded.bytes.len(), path);
        Ok(path)
    }
}
