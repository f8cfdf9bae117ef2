//! Core data types passed between pipeline stages.
//!
//! Each stage consumes its input by value and produces a new owned value, so
//! a buffer is only ever held by one stage at a time.

use image::{DynamicImage, GenericImageView};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::pipeline::encode::OutputFormat;
use crate::pipeline::orientation::Orientation;

/// Reference to an acquired image that has not been decoded yet.
///
/// Produced by the acquisition gate (or a platform adapter) and consumed by
/// the crop stage or the normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImageHandle {
    /// Local file holding the encoded image
    pub path: PathBuf,

    /// Source extension, lowercase, without the dot
    pub extension: Option<String>,

    /// Orientation reported by the source itself (e.g. the capture device).
    /// When absent the EXIF tag of the file is used.
    pub orientation: Option<Orientation>,

    /// The file was created by this library and is deleted after settlement
    pub staged: bool,
}

impl RawImageHandle {
    /// Handle for a file owned by the platform (gallery selection).
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        Self {
            path,
            extension,
            orientation: None,
            staged: false,
        }
    }

    pub(crate) fn staged(mut self) -> Self {
        self.staged = true;
        self
    }

    /// `file://` URI of the source.
    pub fn uri(&self) -> String {
        file_uri(&self.path)
    }
}

/// Decoded pixels still carrying their orientation tag.
#[derive(Debug, Clone)]
pub struct OrientedImage {
    pub image: DynamicImage,
    pub orientation: Orientation,
}

/// Decoded pixels in upright orientation.
///
/// Only the orientation normalizer, crop surfaces and transforms over an
/// existing `PixelBuffer` construct one; holding a `PixelBuffer` means no
/// further rotation or flip is needed to display it row-major.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    image: DynamicImage,
}

impl PixelBuffer {
    /// Wrap pixels the caller knows to be upright.
    pub fn upright(image: DynamicImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_image(self) -> DynamicImage {
        self.image
    }
}

/// The artifact a successful request resolves to.
#[derive(Debug, Clone, Serialize)]
pub struct PickedImage {
    /// Absolute `file://` URI of the encoded file
    pub uri: String,

    /// Filesystem path of the encoded file
    pub path: PathBuf,

    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,

    /// Codec quality on its native 0-100 scale
    pub quality: u8,

    /// Encoded size in bytes
    pub file_size: u64,
}

/// Build an absolute `file://` URI for `path`.
pub fn file_uri(path: &Path) -> String {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    let text = absolute.to_string_lossy().replace('\\', "/");
    if text.starts_with('/') {
        format!("file://{text}")
    } else {
        format!("file:///{text}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_extension_lowercased() {
        let handle = RawImageHandle::from_path("/photos/IMG_0001.JPG");
        assert_eq!(handle.extension.as_deref(), Some("jpg"));
        assert!(!handle.staged);
        assert!(handle.orientation.is_none());
    }

    #[test]
    fn test_handle_without_extension() {
        let handle = RawImageHandle::from_path("/content/media/42");
        assert!(handle.extension.is_none());
    }

    #[test]
    fn test_file_uri_absolute() {
        assert_eq!(
            file_uri(Path::new("/tmp/image-1.webp")),
            "file:///tmp/image-1.webp"
        );
    }

    #[test]
    fn test_file_uri_relative_is_made_absolute() {
        let uri = file_uri(Path::new("out.jpg"));
        assert!(uri.starts_with("file://"));
        assert!(uri.ends_with("/out.jpg"));
    }

    #[test]
    fn test_pixel_buffer_dimensions() {
        let buffer = PixelBuffer::upright(DynamicImage::new_rgb8(30, 20));
        assert_eq!(buffer.dimensions(), (30, 20));
        assert_eq!(buffer.width(), 30);
        assert_eq!(buffer.height(), 20);
    }
}
