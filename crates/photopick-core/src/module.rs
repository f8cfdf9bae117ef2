//! Host binding facade.
//!
//! The host layer calls `openGallery`/`openCamera` with an option map and a
//! completion callback, and expects the callback to fire exactly once with a
//! file URI or a rejection.

use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::continuation::SettleOnce;
use crate::controller::PickerController;
use crate::error::Rejection;
use crate::platform::SourceKind;

/// Entry points exposed to the host binding.
#[derive(Clone)]
pub struct PickerModule {
    controller: Arc<PickerController>,
    runtime: Handle,
}

impl PickerModule {
    pub fn new(controller: Arc<PickerController>, runtime: Handle) -> Self {
        Self {
            controller,
            runtime,
        }
    }

    /// `openGallery(options) -> Promise<fileUri>`.
    pub fn open_gallery(
        &self,
        options: serde_json::Value,
        callback: impl FnOnce(Result<String, Rejection>) + Send + 'static,
    ) -> JoinHandle<()> {
        self.open(SourceKind::Gallery, options, callback)
    }

    /// `openCamera(options) -> Promise<fileUri>`.
    pub fn open_camera(
        &self,
        options: serde_json::Value,
        callback: impl FnOnce(Result<String, Rejection>) + Send + 'static,
    ) -> JoinHandle<()> {
        self.open(SourceKind::Camera, options, callback)
    }

    fn open(
        &self,
        kind: SourceKind,
        options: serde_json::Value,
        callback: impl FnOnce(Result<String, Rejection>) + Send + 'static,
    ) -> JoinHandle<()> {
        let sink = SettleOnce::new(callback);
        let controller = Arc::clone(&self.controller);
        self.runtime.spawn(async move {
            let result = controller
                .open(kind, &options)
                .await
                .map(|picked| picked.uri);
            sink.settle(result);
        })
    }
}
