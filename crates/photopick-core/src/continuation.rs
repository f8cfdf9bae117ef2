//! Bridges from callback-style platform events to awaited values.
//!
//! Platform surfaces finish through delegate callbacks that may fire late,
//! twice, or never. [`continuation`] turns one suspension point into a
//! oneshot: the first `resume` wins, later ones are dropped and logged.
//! [`SettleOnce`] does the same for the host's completion callback.

use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::oneshot;

use crate::error::{CapabilityError, ErrorKind, Rejection};

/// Create a continuation for one suspension point named `label`.
pub fn continuation<T>(label: &'static str) -> (Resumer<T>, Suspension<T>) {
    let (sender, receiver) = oneshot::channel();
    (
        Resumer {
            label,
            sender: Arc::new(Mutex::new(Some(sender))),
        },
        Suspension { label, receiver },
    )
}

/// The callback side. Cloneable so every platform callback path can hold it.
pub struct Resumer<T> {
    label: &'static str,
    sender: Arc<Mutex<Option<oneshot::Sender<T>>>>,
}

impl<T> Clone for Resumer<T> {
    fn clone(&self) -> Self {
        Self {
            label: self.label,
            sender: Arc::clone(&self.sender),
        }
    }
}

impl<T> Resumer<T> {
    /// Complete the suspension. Returns `false` if it was already completed
    /// or nobody is waiting any more.
    pub fn resume(&self, value: T) -> bool {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match sender {
            Some(sender) => {
                if sender.send(value).is_err() {
                    tracing::warn!("{}: completion arrived after the request ended", self.label);
                    return false;
                }
                true
            }
            None => {
                tracing::warn!("{}: duplicate completion dropped", self.label);
                false
            }
        }
    }
}

/// The awaiting side.
pub struct Suspension<T> {
    label: &'static str,
    receiver: oneshot::Receiver<T>,
}

impl<T> Suspension<T> {
    /// Wait for the first completion. Fails if every resumer was dropped
    /// without completing.
    pub async fn wait(self) -> Result<T, CapabilityError> {
        self.receiver
            .await
            .map_err(|_| CapabilityError::Disconnected {
                surface: self.label.to_string(),
            })
    }
}

/// The host's completion callback for one request.
pub type Completion = Box<dyn FnOnce(Result<String, Rejection>) + Send>;

/// Settle-once wrapper around a host completion callback.
pub struct SettleOnce {
    completion: Mutex<Option<Completion>>,
}

impl SettleOnce {
    pub fn new(completion: impl FnOnce(Result<String, Rejection>) + Send + 'static) -> Self {
        Self {
            completion: Mutex::new(Some(Box::new(completion))),
        }
    }

    /// Deliver `result` if nothing was delivered yet. Returns whether this
    /// call delivered.
    pub fn settle(&self, result: Result<String, Rejection>) -> bool {
        let completion = self
            .completion
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match completion {
            Some(completion) => {
                completion(result);
                true
            }
            None => {
                tracing::warn!("Request already settled; dropping {:?}", result);
                false
            }
        }
    }
}

impl Drop for SettleOnce {
    fn drop(&mut self) {
        let completion = self
            .completion
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(completion) = completion {
            tracing::warn!("Request ended without a result");
            completion(Err(Rejection::new(
                ErrorKind::Unknown,
                "Request ended without a result",
            )));
        }
    }
}
