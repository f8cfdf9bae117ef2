//! Orientation normalization.
//!
//! Turns decoded pixels tagged with an EXIF orientation into upright pixels.

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::types::{OrientedImage, PixelBuffer};

/// EXIF orientation (tag 0x0112), named by the transform that makes the
/// stored pixels upright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    /// 1: stored upright
    #[default]
    Identity,
    /// 2: mirrored left-right
    FlipHorizontal,
    /// 3: upside down
    Rotate180,
    /// 4: mirrored top-bottom
    FlipVertical,
    /// 5: mirrored along the main diagonal
    Transpose,
    /// 6: needs a 90° clockwise turn
    Rotate90,
    /// 7: mirrored along the anti-diagonal
    Transverse,
    /// 8: needs a 270° clockwise turn
    Rotate270,
}

impl Orientation {
    /// Map an EXIF orientation value. Absent or out-of-range values are
    /// treated as upright.
    pub fn from_exif(value: u32) -> Self {
        match value {
            2 => Self::FlipHorizontal,
            3 => Self::Rotate180,
            4 => Self::FlipVertical,
            5 => Self::Transpose,
            6 => Self::Rotate90,
            7 => Self::Transverse,
            8 => Self::Rotate270,
            _ => Self::Identity,
        }
    }

    /// Apply the correcting transform to `image`.
    pub fn apply(self, image: DynamicImage) -> DynamicImage {
        match self {
            Self::Identity => image,
            Self::FlipHorizontal => image.fliph(),
            Self::Rotate180 => image.rotate180(),
            Self::FlipVertical => image.flipv(),
            Self::Transpose => image.rotate90().fliph(),
            Self::Rotate90 => image.rotate90(),
            Self::Transverse => image.rotate270().fliph(),
            Self::Rotate270 => image.rotate270(),
        }
    }
}

/// Normalize decoded pixels to upright orientation.
pub fn normalize(oriented: OrientedImage) -> PixelBuffer {
    let OrientedImage { image, orientation } = oriented;
    if orientation != Orientation::Identity {
        tracing::trace!("  Normalizing orientation {:?}", orientation);
    }
    PixelBuffer::upright(orientation.apply(image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};

    /// 3x2 image with a distinct value in every pixel.
    fn sample() -> DynamicImage {
        let mut img = RgbImage::new(3, 2);
        for (x, y, px) in img.enumerate_pixels_mut() {
            *px = Rgb([(x * 10 + y) as u8, 0, 0]);
        }
        DynamicImage::ImageRgb8(img)
    }

    fn red(img: &DynamicImage, x: u32, y: u32) -> u8 {
        img.get_pixel(x, y).0[0]
    }

    fn oriented(orientation: Orientation) -> PixelBuffer {
        normalize(OrientedImage {
            image: sample(),
            orientation,
        })
    }

    #[test]
    fn test_from_exif_values() {
        assert_eq!(Orientation::from_exif(1), Orientation::Identity);
        assert_eq!(Orientation::from_exif(3), Orientation::Rotate180);
        assert_eq!(Orientation::from_exif(6), Orientation::Rotate90);
        assert_eq!(Orientation::from_exif(8), Orientation::Rotate270);
    }

    #[test]
    fn test_degenerate_values_are_identity() {
        assert_eq!(Orientation::from_exif(0), Orientation::Identity);
        assert_eq!(Orientation::from_exif(9), Orientation::Identity);
        assert_eq!(Orientation::from_exif(65535), Orientation::Identity);
    }

    #[test]
    fn test_identity_is_pixel_identical() {
        let before = sample();
        let after = oriented(Orientation::Identity);
        assert_eq!(after.dimensions(), before.dimensions());
        assert_eq!(after.image().as_bytes(), before.as_bytes());
    }

    #[test]
    fn test_rotate90_swaps_and_moves_corner() {
        let out = oriented(Orientation::Rotate90);
        assert_eq!(out.dimensions(), (2, 3));
        // Stored bottom-left ends up top-left after a clockwise turn
        assert_eq!(red(out.image(), 0, 0), red(&sample(), 0, 1));
    }

    #[test]
    fn test_rotate270_moves_corner() {
        let out = oriented(Orientation::Rotate270);
        assert_eq!(out.dimensions(), (2, 3));
        // Stored top-right ends up top-left after a counter-clockwise turn
        assert_eq!(red(out.image(), 0, 0), red(&sample(), 2, 0));
    }

    #[test]
    fn test_transpose_is_diagonal_mirror() {
        let src = sample();
        let out = oriented(Orientation::Transpose);
        assert_eq!(out.dimensions(), (2, 3));
        for y in 0..3 {
            for x in 0..2 {
                assert_eq!(red(out.image(), x, y), red(&src, y, x));
            }
        }
    }

    #[test]
    fn test_transverse_is_anti_diagonal_mirror() {
        let src = sample();
        let out = oriented(Orientation::Transverse);
        assert_eq!(out.dimensions(), (2, 3));
        for y in 0..3 {
            for x in 0..2 {
                assert_eq!(red(out.image(), x, y), red(&src, 2 - y, 1 - x));
            }
        }
    }

    #[test]
    fn test_flips_keep_dimensions() {
        let src = sample();
        let h = oriented(Orientation::FlipHorizontal);
        assert_eq!(h.dimensions(), (3, 2));
        assert_eq!(red(h.image(), 0, 0), red(&src, 2, 0));

        let v = oriented(Orientation::FlipVertical);
        assert_eq!(red(v.image(), 0, 0), red(&src, 0, 1));

        let r = oriented(Orientation::Rotate180);
        assert_eq!(red(r.image(), 0, 0), red(&src, 2, 1));
    }
}
