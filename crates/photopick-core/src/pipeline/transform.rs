//! Aspect-fill ("resize and cover") transform.
//!
//! Scales the source uniformly until it covers the target, then extracts a
//! centred sub-rectangle of exactly the target size. The pixel work runs in
//! the other order: the visible region is cut from the source first and only
//! that region is resampled, so the working buffer never exceeds the larger
//! of the source and the target. The plan is computed separately from the
//! pixel work so it can be tested without images.

use image::imageops::FilterType;

use crate::error::{PipelineError, PipelineResult};
use crate::types::PixelBuffer;

/// Scale and crop geometry for one aspect-fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillPlan {
    pub scaled_width: u32,
    pub scaled_height: u32,
    pub crop_x: u32,
    pub crop_y: u32,
    pub target_width: u32,
    pub target_height: u32,
    /// The crop window mapped back onto the unscaled source
    pub source_x: u32,
    pub source_y: u32,
    pub source_width: u32,
    pub source_height: u32,
}

impl FillPlan {
    /// True when the source already has the target size.
    pub fn is_identity(&self, source: (u32, u32)) -> bool {
        source == (self.target_width, self.target_height)
    }
}

/// Compute the aspect-fill plan for `source` into `target`.
///
/// A wider source is scaled to the target height and cropped horizontally;
/// otherwise it is scaled to the target width and cropped vertically. Equal
/// aspects take the second branch and end with a zero offset.
///
/// Both inputs must be non-zero.
pub fn plan_fill(source: (u32, u32), target: (u32, u32)) -> FillPlan {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let src_aspect = src_w as f64 / src_h as f64;
    let tgt_aspect = tgt_w as f64 / tgt_h as f64;

    if src_aspect > tgt_aspect {
        // Source is wider: height matches, width overflows
        let scaled_width = ((tgt_h as f64 * src_aspect).round() as u32).max(tgt_w);
        let crop_x = (scaled_width - tgt_w) / 2;
        // One target row spans src_h / tgt_h source rows
        let ratio = src_h as f64 / tgt_h as f64;
        let source_width = ((tgt_w as f64 * ratio).round() as u32).clamp(1, src_w);
        let source_x = ((crop_x as f64 * ratio).round() as u32).min(src_w - source_width);
        FillPlan {
            scaled_width,
            scaled_height: tgt_h,
            crop_x,
            crop_y: 0,
            target_width: tgt_w,
            target_height: tgt_h,
            source_x,
            source_y: 0,
            source_width,
            source_height: src_h,
        }
    } else {
        // Source is taller or equal: width matches, height overflows
        let scaled_height = ((tgt_w as f64 / src_aspect).round() as u32).max(tgt_h);
        let crop_y = (scaled_height - tgt_h) / 2;
        let ratio = src_w as f64 / tgt_w as f64;
        let source_height = ((tgt_h as f64 * ratio).round() as u32).clamp(1, src_h);
        let source_y = ((crop_y as f64 * ratio).round() as u32).min(src_h - source_height);
        FillPlan {
            scaled_width: tgt_w,
            scaled_height,
            crop_x: 0,
            crop_y,
            target_width: tgt_w,
            target_height: tgt_h,
            source_x: 0,
            source_y,
            source_width: src_w,
            source_height,
        }
    }
}

/// Aspect-fill `pixels` to exactly `width x height`.
///
/// Upscaling is not capped. Sources that already have the exact size are
/// returned untouched.
pub fn aspect_fill(pixels: PixelBuffer, width: u32, height: u32) -> PipelineResult<PixelBuffer> {
    if width == 0 || height == 0 {
        return Err(PipelineError::InvalidDimensions { width, height });
    }
    let source = pixels.dimensions();
    if source.0 == 0 || source.1 == 0 {
        return Err(PipelineError::InvalidDimensions {
            width: source.0,
            height: source.1,
        });
    }

    let plan = plan_fill(source, (width, height));
    if plan.is_identity(source) {
        return Ok(pixels);
    }
    tracing::trace!(
        "  Aspect-fill {}x{} -> {}x{} (region {}x{} at {},{})",
        source.0,
        source.1,
        width,
        height,
        plan.source_width,
        plan.source_height,
        plan.source_x,
        plan.source_y
    );

    let image = pixels.into_image();
    let region = if (plan.source_width, plan.source_height) == source {
        image
    } else {
        image.crop_imm(
            plan.source_x,
            plan.source_y,
            plan.source_width,
            plan.source_height,
        )
    };
    let filled = if (plan.source_width, plan.source_height) == (width, height) {
        region
    } else {
        region.resize_exact(width, height, FilterType::Lanczos3)
    };
    Ok(PixelBuffer::upright(filled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GenericImageView, Rgb, RgbImage};

    #[test]
    fn test_plan_landscape_into_square() {
        let plan = plan_fill((4000, 3000), (400, 400));
        assert_eq!((plan.scaled_width, plan.scaled_height), (533, 400));
        assert_eq!((plan.crop_x, plan.crop_y), (66, 0));
    }

    #[test]
    fn test_plan_portrait_into_square() {
        let plan = plan_fill((3000, 4000), (200, 200));
        assert_eq!((plan.scaled_width, plan.scaled_height), (200, 267));
        assert_eq!((plan.crop_x, plan.crop_y), (0, 33));
    }

    #[test]
    fn test_plan_equal_aspect_has_no_offset() {
        let plan = plan_fill((1600, 900), (320, 180));
        assert_eq!((plan.scaled_width, plan.scaled_height), (320, 180));
        assert_eq!((plan.crop_x, plan.crop_y), (0, 0));
    }

    #[test]
    fn test_plan_upscales_small_sources() {
        let plan = plan_fill((10, 20), (400, 400));
        assert_eq!((plan.scaled_width, plan.scaled_height), (400, 800));
        assert_eq!(plan.crop_y, 200);
    }

    #[test]
    fn test_plan_always_covers_target() {
        let sources = [(1, 1), (1, 999), (999, 1), (4032, 3024), (37, 53), (7, 3)];
        let targets = [(1, 1), (200, 200), (1080, 1920), (3, 7), (640, 480)];
        for &source in &sources {
            for &target in &targets {
                let plan = plan_fill(source, target);
                assert!(plan.scaled_width >= target.0, "{source:?} -> {target:?}");
                assert!(plan.scaled_height >= target.1, "{source:?} -> {target:?}");
                assert!(plan.crop_x + target.0 <= plan.scaled_width);
                assert!(plan.crop_y + target.1 <= plan.scaled_height);
                assert!(plan.source_x + plan.source_width <= source.0);
                assert!(plan.source_y + plan.source_height <= source.1);
                // One axis always matches the target exactly
                assert!(plan.scaled_width == target.0 || plan.scaled_height == target.1);
            }
        }
    }

    #[test]
    fn test_plan_source_region_is_centred() {
        let plan = plan_fill((4000, 3000), (400, 400));
        assert_eq!((plan.source_width, plan.source_height), (3000, 3000));
        assert_eq!((plan.source_x, plan.source_y), (495, 0));

        let plan = plan_fill((3000, 4000), (200, 200));
        assert_eq!((plan.source_width, plan.source_height), (3000, 3000));
        assert_eq!((plan.source_x, plan.source_y), (0, 495));
    }

    #[test]
    fn test_plan_extreme_aspect_keeps_region_small() {
        let plan = plan_fill((16384, 1), (400, 400));
        assert_eq!((plan.source_width, plan.source_height), (1, 1));
        assert_eq!(plan.source_x, 8192);

        let plan = plan_fill((1, 16384), (300, 100));
        assert_eq!((plan.source_width, plan.source_height), (1, 1));
        assert!(plan.source_y < 16384);
    }

    #[test]
    fn test_aspect_fill_extreme_aspect_source() {
        let pixels = PixelBuffer::upright(DynamicImage::new_rgb8(16384, 1));
        let out = aspect_fill(pixels, 400, 400).unwrap();
        assert_eq!(out.dimensions(), (400, 400));
    }

    #[test]
    fn test_aspect_fill_exact_dimensions() {
        let cases = [((640, 480), (200, 200)), ((300, 900), (120, 80)), ((5, 5), (64, 32))];
        for (source, target) in cases {
            let pixels = PixelBuffer::upright(DynamicImage::new_rgb8(source.0, source.1));
            let out = aspect_fill(pixels, target.0, target.1).unwrap();
            assert_eq!(out.dimensions(), target);
        }
    }

    #[test]
    fn test_aspect_fill_keeps_centre() {
        // Wide image: left third red, middle green, right third blue
        let mut img = RgbImage::new(300, 100);
        for (x, _, px) in img.enumerate_pixels_mut() {
            *px = match x {
                0..=99 => Rgb([255, 0, 0]),
                100..=199 => Rgb([0, 255, 0]),
                _ => Rgb([0, 0, 255]),
            };
        }
        let pixels = PixelBuffer::upright(DynamicImage::ImageRgb8(img));
        let out = aspect_fill(pixels, 50, 50).unwrap();
        let centre = out.image().get_pixel(25, 25).0;
        assert!(centre[1] > 200 && centre[0] < 50 && centre[2] < 50);
    }

    #[test]
    fn test_aspect_fill_exact_size_is_untouched() {
        let pixels = PixelBuffer::upright(DynamicImage::new_rgb8(200, 200));
        let bytes = pixels.image().as_bytes().to_vec();
        let out = aspect_fill(pixels, 200, 200).unwrap();
        assert_eq!(out.image().as_bytes(), bytes.as_slice());
    }

    #[test]
    fn test_aspect_fill_rejects_zero_target() {
        let pixels = PixelBuffer::upright(DynamicImage::new_rgb8(10, 10));
        let err = aspect_fill(pixels, 0, 10).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidDimensions { .. }));
    }
}
