//! Per-request picker options.
//!
//! The host binding hands over a loosely typed option map (camelCase keys,
//! numbers possibly fractional). Unknown keys are ignored, missing or `null`
//! keys take their defaults, and platform-dependent defaults come from
//! [`PlatformConfig`]. The resulting [`PickerOptions`] is immutable for the
//! lifetime of the request.

use serde::{Deserialize, Deserializer, Serialize};

use crate::capability::{CameraFacing, CropMask};
use crate::config::PlatformConfig;
use crate::error::OptionsError;
use crate::pipeline::encode::OutputFormat;

/// Default output edge length in pixels.
pub const DEFAULT_SIZE: u32 = 200;

/// Default compression quality.
pub const DEFAULT_COMPRESSION_QUALITY: f32 = 0.5;

/// Validated options for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PickerOptions {
    pub is_cropping: bool,
    pub width: u32,
    pub height: u32,
    pub compression_quality: f32,
    #[serde(rename = "useWebP")]
    pub use_webp: bool,
    pub should_resize: bool,
    pub use_front_camera: bool,
    pub use_native_cropper: bool,
    pub is_crop_circular: bool,
    pub is_temp: bool,
}

/// The option map as sent by the host, before defaults are applied.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOptions {
    is_cropping: Option<bool>,
    #[serde(default, deserialize_with = "dimension")]
    width: Option<u32>,
    #[serde(default, deserialize_with = "dimension")]
    height: Option<u32>,
    compression_quality: Option<f32>,
    #[serde(rename = "useWebP")]
    use_webp: Option<bool>,
    should_resize: Option<bool>,
    use_front_camera: Option<bool>,
    use_native_cropper: Option<bool>,
    is_crop_circular: Option<bool>,
    is_temp: Option<bool>,
}

/// Accept JS numbers (`400` or `400.0`) for pixel dimensions.
fn dimension<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(value) = Option::<f64>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if !value.is_finite() || value < 0.0 || value > u32::MAX as f64 {
        return Err(serde::de::Error::custom(format!(
            "dimension out of range: {value}"
        )));
    }
    Ok(Some(value.round() as u32))
}

impl PickerOptions {
    /// Defaults for every key, with the platform-dependent ones taken from
    /// `platform`.
    pub fn defaults(platform: &PlatformConfig) -> Self {
        Self {
            is_cropping: true,
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            compression_quality: DEFAULT_COMPRESSION_QUALITY,
            use_webp: true,
            should_resize: true,
            use_front_camera: platform.front_camera_default,
            use_native_cropper: platform.native_cropper_default,
            is_crop_circular: platform.crop_circular_default,
            is_temp: platform.temp_default,
        }
    }

    /// Build options from the host's option map and validate them.
    ///
    /// `null` is treated as an empty map.
    pub fn from_value(
        value: &serde_json::Value,
        platform: &PlatformConfig,
    ) -> Result<Self, OptionsError> {
        let raw = if value.is_null() {
            RawOptions::default()
        } else {
            RawOptions::deserialize(value)?
        };

        let defaults = Self::defaults(platform);
        let options = Self {
            is_cropping: raw.is_cropping.unwrap_or(defaults.is_cropping),
            width: raw.width.unwrap_or(defaults.width),
            height: raw.height.unwrap_or(defaults.height),
            compression_quality: raw
                .compression_quality
                .unwrap_or(defaults.compression_quality),
            use_webp: raw.use_webp.unwrap_or(defaults.use_webp),
            should_resize: raw.should_resize.unwrap_or(defaults.should_resize),
            use_front_camera: raw.use_front_camera.unwrap_or(defaults.use_front_camera),
            use_native_cropper: raw
                .use_native_cropper
                .unwrap_or(defaults.use_native_cropper),
            is_crop_circular: raw.is_crop_circular.unwrap_or(defaults.is_crop_circular),
            is_temp: raw.is_temp.unwrap_or(defaults.is_temp),
        };
        options.validate()?;
        Ok(options)
    }

    /// Check the option invariants.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if !self.compression_quality.is_finite()
            || !(0.0..=1.0).contains(&self.compression_quality)
        {
            return Err(OptionsError::Invalid(format!(
                "compressionQuality must be between 0.0 and 1.0, got {}",
                self.compression_quality
            )));
        }
        if (self.is_cropping || self.should_resize) && (self.width == 0 || self.height == 0) {
            return Err(OptionsError::Invalid(format!(
                "width and height must be > 0 when cropping or resizing, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Requested output dimensions.
    pub fn target(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn output_format(&self) -> OutputFormat {
        if self.use_webp {
            OutputFormat::WebP
        } else {
            OutputFormat::Jpeg
        }
    }

    pub fn camera_facing(&self) -> CameraFacing {
        if self.use_front_camera {
            CameraFacing::Front
        } else {
            CameraFacing::Rear
        }
    }

    pub fn crop_mask(&self) -> CropMask {
        if self.is_crop_circular {
            CropMask::Circle
        } else {
            CropMask::Rectangle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn platform() -> PlatformConfig {
        PlatformConfig::default()
    }

    #[test]
    fn test_empty_map_takes_defaults() {
        let options = PickerOptions::from_value(&json!({}), &platform()).unwrap();
        assert!(options.is_cropping);
        assert_eq!(options.target(), (200, 200));
        assert_eq!(options.compression_quality, 0.5);
        assert!(options.use_webp);
        assert!(options.should_resize);
    }

    #[test]
    fn test_null_map_takes_defaults() {
        let options = PickerOptions::from_value(&serde_json::Value::Null, &platform()).unwrap();
        assert_eq!(options, PickerOptions::defaults(&platform()));
    }

    #[test]
    fn test_platform_defaults_apply() {
        let platform = PlatformConfig {
            front_camera_default: false,
            temp_default: false,
            crop_circular_default: false,
            ..PlatformConfig::default()
        };
        let options = PickerOptions::from_value(&json!({}), &platform).unwrap();
        assert!(!options.use_front_camera);
        assert!(!options.is_temp);
        assert_eq!(options.crop_mask(), CropMask::Rectangle);
    }

    #[test]
    fn test_unknown_keys_ignored_and_floats_accepted() {
        let options = PickerOptions::from_value(
            &json!({"width": 400.0, "height": 300, "somethingElse": [1, 2], "useWebP": false}),
            &platform(),
        )
        .unwrap();
        assert_eq!(options.target(), (400, 300));
        assert_eq!(options.output_format(), OutputFormat::Jpeg);
    }

    #[test]
    fn test_null_value_means_default() {
        let options =
            PickerOptions::from_value(&json!({"width": null, "isTemp": null}), &platform())
                .unwrap();
        assert_eq!(options.width, DEFAULT_SIZE);
        assert!(options.is_temp);
    }

    #[test]
    fn test_quality_out_of_range_rejected() {
        let err = PickerOptions::from_value(&json!({"compressionQuality": 1.5}), &platform())
            .unwrap_err();
        assert!(err.to_string().contains("compressionQuality"));
    }

    #[test]
    fn test_quality_boundaries_accepted() {
        for quality in [0.0, 1.0] {
            let options =
                PickerOptions::from_value(&json!({"compressionQuality": quality}), &platform())
                    .unwrap();
            assert_eq!(options.compression_quality, quality as f32);
        }
    }

    #[test]
    fn test_zero_dimension_rejected_when_resizing() {
        let err = PickerOptions::from_value(&json!({"width": 0}), &platform()).unwrap_err();
        assert!(err.to_string().contains("width and height"));
    }

    #[test]
    fn test_zero_dimension_allowed_without_crop_or_resize() {
        let options = PickerOptions::from_value(
            &json!({"width": 0, "height": 0, "isCropping": false, "shouldResize": false}),
            &platform(),
        )
        .unwrap();
        assert_eq!(options.target(), (0, 0));
    }

    #[test]
    fn test_negative_dimension_is_malformed() {
        let err = PickerOptions::from_value(&json!({"width": -5}), &platform()).unwrap_err();
        assert!(matches!(err, OptionsError::Malformed(_)));
    }

    #[test]
    fn test_wrong_type_is_malformed() {
        let err =
            PickerOptions::from_value(&json!({"isCropping": "yes"}), &platform()).unwrap_err();
        assert!(matches!(err, OptionsError::Malformed(_)));
    }

    #[test]
    fn test_camera_facing() {
        let options =
            PickerOptions::from_value(&json!({"useFrontCamera": false}), &platform()).unwrap();
        assert_eq!(options.camera_facing(), CameraFacing::Rear);
    }
}
