//! Decoding of acquired files with format detection, limits and timeout.

use image::{DynamicImage, ImageDecoder as _, ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

use super::metadata::MetadataExtractor;
use super::orientation::Orientation;

/// Image decoder with configurable limits.
#[derive(Debug, Clone)]
pub struct ImageDecoder {
    limits: LimitsConfig,
}

/// Result of decoding an acquired file.
#[derive(Debug)]
pub struct DecodedImage {
    /// The decoded pixels, still in stored orientation
    pub image: DynamicImage,
    /// Detected image format
    pub format: ImageFormat,
    /// EXIF orientation found in the file, if any
    pub exif_orientation: Option<Orientation>,
    /// Original file size in bytes
    pub file_size: u64,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Read and decode `path` on a blocking worker, bounded by the decode
    /// timeout.
    ///
    /// `extension` names the format when the content cannot be sniffed.
    pub async fn decode(
        &self,
        path: &Path,
        extension: Option<&str>,
    ) -> Result<DecodedImage, PipelineError> {
        let decoder = self.clone();
        let path_owned = path.to_path_buf();
        let extension_owned = extension.map(str::to_owned);
        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);

        let decode_result = timeout(
            timeout_duration,
            tokio::task::spawn_blocking(move || {
                decoder.decode_sync(&path_owned, extension_owned.as_deref())
            }),
        )
        .await;

        match decode_result {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Task join error: {}", e),
            }),
            Err(_) => Err(PipelineError::Timeout {
                path: path.to_path_buf(),
                stage: "decode".to_string(),
                timeout_ms: self.limits.decode_timeout_ms,
            }),
        }
    }

    /// Read and decode `path` on the current thread.
    pub fn decode_sync(
        &self,
        path: &Path,
        extension: Option<&str>,
    ) -> Result<DecodedImage, PipelineError> {
        let bytes = std::fs::read(path).map_err(|e| PipelineError::from_read(path, e))?;
        self.decode_bytes(bytes, path, extension)
    }

    /// Decode an in-memory file.
    ///
    /// The dimension limit is checked against the header before any pixel
    /// buffer is allocated.
    pub fn decode_bytes(
        &self,
        bytes: Vec<u8>,
        path: &Path,
        extension: Option<&str>,
    ) -> Result<DecodedImage, PipelineError> {
        let decode_error = |e: image::ImageError| PipelineError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        let exif_orientation = MetadataExtractor::orientation_from_bytes(&bytes);
        let file_size = bytes.len() as u64;
        let mut reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot detect image format: {}", e),
            })?;
        let format = match reader.format() {
            Some(f) => f,
            None => {
                let hinted = extension.and_then(ImageFormat::from_extension).ok_or_else(|| {
                    PipelineError::UnsupportedFormat {
                        path: path.to_path_buf(),
                        format: extension.unwrap_or("unknown").to_string(),
                    }
                })?;
                reader.set_format(hinted);
                hinted
            }
        };

        let decoder = reader.into_decoder().map_err(decode_error)?;
        let (width, height) = decoder.dimensions();
        if width > self.limits.max_image_dimension || height > self.limits.max_image_dimension {
            return Err(PipelineError::ImageTooLarge {
                path: path.to_path_buf(),
                width,
                height,
                max_dim: self.limits.max_image_dimension,
            });
        }
        let image = DynamicImage::from_decoder(decoder).map_err(decode_error)?;

        Ok(DecodedImage {
            image,
            format,
            exif_orientation,
            file_size,
        })
    }
}
