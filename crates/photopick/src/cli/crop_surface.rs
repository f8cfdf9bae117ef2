//! Terminal crop surface: choose where the locked-aspect frame sits.

use async_trait::async_trait;
use dialoguer::Select;
use photopick_core::{CapabilityError, CropAnchor, CropPreview, CropRect, CropSurface, Outcome};

use super::theme;

const CHOICES: &[&str] = &["Centre", "Top / left", "Bottom / right", "Cancel"];

/// Asks on stderr when attached to a terminal; otherwise takes the centre.
pub struct TerminalCropSurface {
    interactive: bool,
}

impl TerminalCropSurface {
    pub fn new(interactive: bool) -> Self {
        Self { interactive }
    }

    /// Interactive when stderr is a terminal.
    pub fn detect() -> Self {
        Self::new(console::Term::stderr().is_term())
    }
}

fn anchor_for(choice: Option<usize>) -> Option<CropAnchor> {
    match choice {
        Some(0) => Some(CropAnchor::Center),
        Some(1) => Some(CropAnchor::Start),
        Some(2) => Some(CropAnchor::End),
        _ => None,
    }
}

#[async_trait]
impl CropSurface for TerminalCropSurface {
    async fn select(&self, preview: &CropPreview) -> Result<Outcome<CropRect>, CapabilityError> {
        let image = (preview.width, preview.height);
        if !self.interactive {
            return Ok(Outcome::Completed(CropRect::anchored(
                image,
                preview.aspect,
                CropAnchor::Center,
            )));
        }

        let prompt = format!("Crop {}", theme::preview_line(preview));
        let choice = tokio::task::spawn_blocking(move || {
            Select::with_theme(&theme::crop_theme())
                .with_prompt(prompt)
                .items(CHOICES)
                .default(0)
                .interact_opt()
        })
        .await
        .map_err(|e| CapabilityError::CropFailed(e.to_string()))?
        .map_err(|e| CapabilityError::CropFailed(e.to_string()))?;

        Ok(match anchor_for(choice) {
            Some(anchor) => Outcome::Completed(CropRect::anchored(image, preview.aspect, anchor)),
            None => Outcome::Cancelled,
        })
    }
}
