//! Image processing pipeline components.
//!
//! The compute stages a request runs after acquisition:
//! - **validate**: Cheap pre-decode checks on the acquired file
//! - **decode**: Load and decode the acquired file
//! - **metadata**: Read the EXIF orientation tag
//! - **orientation**: Normalize pixels to upright
//! - **transform**: Aspect-fill to the exact target size
//! - **encode**: Encode as WebP/JPEG and persist under a fresh name
//! - **processor**: Orchestrates the stages above

pub mod decode;
pub mod encode;
pub mod metadata;
pub mod orientation;
pub mod processor;
pub mod transform;
pub mod validate;

// Re-exports for convenient access
pub use decode::{DecodedImage, ImageDecoder};
pub use encode::{encode, native_quality, EncodedImage, ImageStore, OutputFormat};
pub use metadata::MetadataExtractor;
pub use orientation::{normalize, Orientation};
pub use processor::{ImageProcessor, RenderPlan};
pub use transform::{aspect_fill, plan_fill, FillPlan};
pub use validate::Validator;
