//! The `photopick gallery` and `photopick camera` commands.
//!
//! Flags are folded into the same loosely typed option map a mobile host
//! binding would send, and the request goes through [`PickerModule`] so the
//! desktop host exercises the settle-once callback path.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use photopick_core::{
    Capabilities, Config, Permission, PickerController, PickerModule, Rejection, SourceKind,
};
use serde_json::{json, Map, Value};
use tokio::sync::oneshot;

use super::crop_surface::TerminalCropSurface;
use super::desktop::{self, DesktopHost, DesktopPermissions, FileCamera, FileGallery};

/// Arguments shared by `gallery` and `camera`.
#[derive(Args, Debug, Clone, Default)]
pub struct PickArgs {
    /// Image file standing in for the user's pick or the camera shot
    pub file: PathBuf,

    /// Output width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Output height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Compression quality, 0.0 to 1.0
    #[arg(long)]
    pub quality: Option<f32>,

    /// Encode JPEG instead of WebP
    #[arg(long)]
    pub jpeg: bool,

    /// Skip the interactive crop step
    #[arg(long)]
    pub no_crop: bool,

    /// Keep the upright size unless cropping
    #[arg(long)]
    pub no_resize: bool,

    /// Use the rear camera
    #[arg(long)]
    pub rear: bool,

    /// Write into the persistent media directory instead of the temp directory
    #[arg(long)]
    pub persist: bool,

    /// Preview the crop region as a circle
    #[arg(long)]
    pub circular: bool,

    /// Prefer the platform's native cropper
    #[arg(long)]
    pub native_cropper: bool,

    /// Raw option map (camelCase keys); flags override its entries
    #[arg(long, value_name = "JSON")]
    pub options_json: Option<String>,

    /// Deny a permission (camera, storage, photo-library or a platform name)
    #[arg(long = "deny", value_name = "PERMISSION", value_parser = desktop::parse_permission)]
    pub deny: Vec<Permission>,
}

impl PickArgs {
    /// Build the option map a host binding would send.
    pub fn options_map(&self) -> anyhow::Result<Value> {
        let raw = match &self.options_json {
            Some(raw) => serde_json::from_str::<Value>(raw).context("Invalid --options-json")?,
            None => Value::Null,
        };
        let mut map = match raw {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => anyhow::bail!("--options-json must be a JSON object, got {}", other),
        };

        let mut set = |key: &str, value: Value| {
            map.insert(key.to_string(), value);
        };
        if let Some(width) = self.width {
            set("width", json!(width));
        }
        if let Some(height) = self.height {
            set("height", json!(height));
        }
        if let Some(quality) = self.quality {
            set("compressionQuality", json!(quality));
        }
        if self.jpeg {
            set("useWebP", json!(false));
        }
        if self.no_crop {
            set("isCropping", json!(false));
        }
        if self.no_resize {
            set("shouldResize", json!(false));
        }
        if self.rear {
            set("useFrontCamera", json!(false));
        }
        if self.persist {
            set("isTemp", json!(false));
        }
        if self.circular {
            set("isCropCircular", json!(true));
        }
        if self.native_cropper {
            set("useNativeCropper", json!(true));
        }
        Ok(Value::Object(map))
    }
}

/// Run one request and print the resolved URI.
pub async fn execute(kind: SourceKind, args: PickArgs, config: Config) -> anyhow::Result<()> {
    let options = args.options_map()?;
    tracing::debug!("Option map: {}", options);

    let capabilities = Capabilities::new(
        Arc::new(DesktopHost),
        Arc::new(DesktopPermissions::new(args.deny.clone())),
        Arc::new(FileGallery::new(args.file.clone())),
        Some(Arc::new(FileCamera::new(args.file.clone()))),
    )
    .with_crop_surface(Arc::new(TerminalCropSurface::detect()));
    let controller = Arc::new(PickerController::new(config, capabilities));
    let module = PickerModule::new(controller, tokio::runtime::Handle::current());

    let (sender, receiver) = oneshot::channel::<Result<String, Rejection>>();
    let callback = move |result| {
        let _ = sender.send(result);
    };
    let task = match kind {
        SourceKind::Gallery => module.open_gallery(options, callback),
        SourceKind::Camera => module.open_camera(options, callback),
    };

    let result = receiver
        .await
        .context("Request finished without settling")?;
    task.await.context("Request task failed")?;

    match result {
        Ok(uri) => {
            println!("{}", uri);
            Ok(())
        }
        Err(rejection) => Err(rejection.into()),
    }
}
