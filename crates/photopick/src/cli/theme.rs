//! Dialoguer theme for the terminal crop surface.

use console::{style, Style};
use dialoguer::theme::ColorfulTheme;

/// `ColorfulTheme` drawn on stderr so stdout stays clean for the URI.
pub fn crop_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("?".to_string()).for_stderr().cyan(),
        prompt_style: Style::new().for_stderr().bold(),
        prompt_suffix: style("›".to_string()).for_stderr().bright().black(),
        active_item_prefix: style("▸".to_string()).for_stderr().cyan(),
        active_item_style: Style::new().for_stderr().cyan(),
        success_prefix: style("✓".to_string()).for_stderr().green(),
        success_suffix: style("·".to_string()).for_stderr().bright().black(),
        error_prefix: style("✗".to_string()).for_stderr().red(),
        error_style: Style::new().for_stderr().red(),
        values_style: Style::new().for_stderr().green(),
        ..ColorfulTheme::default()
    }
}

/// One-line description of the crop preview, e.g. `1600x1200 → 1:1 (circle)`.
pub fn preview_line(preview: &photopick_core::CropPreview) -> String {
    let (w, h) = reduce(preview.aspect);
    let mask = match preview.mask {
        photopick_core::CropMask::Circle => "circle",
        photopick_core::CropMask::Rectangle => "rectangle",
    };
    format!(
        "{}x{} {} {}:{} ({})",
        preview.width,
        preview.height,
        style("→").for_stderr().dim(),
        w,
        h,
        mask
    )
}

fn reduce((w, h): (u32, u32)) -> (u32, u32) {
    fn gcd(a: u32, b: u32) -> u32 {
        if b == 0 {
            a
        } else {
            gcd(b, a % b)
        }
    }
    match gcd(w, h) {
        0 => (w, h),
        d => (w / d, h / d),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduce_aspect() {
        assert_eq!(reduce((400, 400)), (1, 1));
        assert_eq!(reduce((1920, 1080)), (16, 9));
        assert_eq!(reduce((0, 0)), (0, 0));
    }
}
