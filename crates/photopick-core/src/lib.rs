//! Photopick Core - single-photo picker pipeline.
//!
//! Photopick asks the platform for one photo, from the gallery or the
//! camera, and turns it into an upright, aspect-filled, compressed image file
//! on disk. Platform UI (permission prompts, picker, camera, crop widget) is
//! reached through the capability traits in [`capability`]; everything after
//! acquisition runs in-process.
//!
//! # Architecture
//!
//! ```text
//! open → options → permissions → gallery/camera → [crop] → normalize → aspect-fill → encode → URI
//! ```
//!
//! A controller serves one request at a time and settles each request
//! exactly once.
//!
//! # Usage
//!
//! ```rust,ignore
//! use photopick_core::{Capabilities, Config, PickerController};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let capabilities = Capabilities::new(host, permissions, gallery, Some(camera));
//!     let controller = PickerController::new(config, capabilities);
//!
//!     let picked = controller
//!         .open_gallery(&serde_json::json!({ "width": 400, "height": 400 }))
//!         .await?;
//!     println!("{}", picked.uri);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod acquire;
pub mod capability;
pub mod config;
pub mod continuation;
pub mod controller;
pub mod crop;
pub mod error;
pub mod module;
pub mod options;
pub mod pipeline;
pub mod platform;
pub mod types;

// Re-exports for convenient access
pub use capability::{
    Camera, CameraFacing, CaptureRequest, CapturedPhoto, CropMask, CropRequest, Cropper,
    GalleryPicker, GalleryRequest, Host, Outcome, PermissionProvider, PermissionStatus,
};
pub use config::Config;
pub use continuation::{continuation, Resumer, SettleOnce, Suspension};
pub use controller::{Capabilities, LifecycleState, PickerController, RequestId};
pub use crop::{CropAnchor, CropPreview, CropRect, CropSurface, InProcessCropper};
pub use error::{
    CapabilityError, ConfigError, ErrorKind, OptionsError, PickerError, PipelineError,
    PipelineResult, Rejection, Result,
};
pub use module::PickerModule;
pub use options::PickerOptions;
pub use pipeline::{ImageProcessor, Orientation, OutputFormat};
pub use platform::{CapabilityTier, Permission, SourceKind};
pub use types::{PickedImage, PixelBuffer, RawImageHandle};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
