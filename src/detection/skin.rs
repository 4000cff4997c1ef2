//! Skin region detection by dual color-space thresholding
//!
//! A pixel is skin only when both heuristics agree:
//! - HSV: hue, saturation and value inside the configured 8-bit ranges
//! - YCrCb: luma and chroma inside the configured 8-bit ranges
//!
//! The intersection is cleaned with an elliptical opening then closing and
//! finally blurred so region boundaries carry soft, antialiased weights.

use image::{GrayImage, Luma, RgbImage};
use log::debug;

use crate::color::conversion::{rgb_to_hsv8, rgb_to_ycrcb, to_hsv_image, to_ycrcb_image};
use crate::config::SkinDetectionConfig;
use crate::constants::{morphology as morph, skin};
use crate::detection::mask::SkinMask;
use crate::detection::morphology::{close, gaussian_blur, open, StructuringElement};
use crate::Result;

/// Skin detector implementing HSV and YCrCb range intersection
#[derive(Debug, Clone)]
pub struct SkinDetector {
    config: SkinDetectionConfig,
    element: StructuringElement,
}

impl Default for SkinDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl SkinDetector {
    /// Create a detector with the default ranges and analysis edge blur
    pub fn new() -> Self {
        Self::with_config(SkinDetectionConfig::default())
    }

    /// Create a detector from explicit configuration
    pub fn with_config(config: SkinDetectionConfig) -> Self {
        let element = StructuringElement::ellipse(config.ellipse_radius);
        Self { config, element }
    }

    /// Same ranges, wider edge blur, as used before editing pixels
    pub fn for_modification() -> Self {
        Self::with_config(SkinDetectionConfig {
            blur_kernel: morph::MODIFIER_BLUR_KERNEL,
            ..SkinDetectionConfig::default()
        })
    }

    /// Copy of this detector with a different edge blur kernel
    pub fn with_blur_kernel(&self, blur_kernel: u32) -> Self {
        Self::with_config(SkinDetectionConfig {
            blur_kernel,
            ..self.config.clone()
        })
    }

    pub fn config(&self) -> &SkinDetectionConfig {
        &self.config
    }

    /// Detect skin and return a smoothed mask congruent with `image`
    ///
    /// An all-zero mask is a valid result meaning no skin was found.
    ///
    /// # Errors
    ///
    /// Returns `ConversionError` if the image cannot be converted (no pixels).
    pub fn detect(&self, image: &RgbImage) -> Result<SkinMask> {
        let raw = self.raw_mask(image)?;

        let opened = open(&raw, &self.element);
        let cleaned = close(&opened, &self.element);
        let smoothed = gaussian_blur(&cleaned, self.config.blur_kernel);

        let mask = SkinMask::from_levels(smoothed);
        debug!(
            "skin mask {}x{}: coverage {:.3}",
            mask.width(),
            mask.height(),
            mask.coverage()
        );
        Ok(mask)
    }

    /// Intersection of the HSV and YCrCb range tests, before any cleanup
    ///
    /// Cells are 255 where both color spaces agree on skin and 0 elsewhere.
    pub fn raw_mask(&self, image: &RgbImage) -> Result<GrayImage> {
        let hsv = to_hsv_image(image)?;
        let ycrcb = to_ycrcb_image(image)?;

        let (width, height) = image.dimensions();
        Ok(GrayImage::from_fn(width, height, |x, y| {
            let in_hsv = in_range(
                hsv.get_pixel(x, y).0,
                self.config.hsv_lower,
                self.config.hsv_upper,
            );
            let in_ycrcb = in_range(
                ycrcb.get_pixel(x, y).0,
                self.config.ycrcb_lower,
                self.config.ycrcb_upper,
            );
            Luma([if in_hsv && in_ycrcb { skin::MASK_ON } else { 0 }])
        }))
    }

    /// Whether a single RGB pixel passes both range tests
    pub fn is_skin_color(&self, rgb: [u8; 3]) -> bool {
        in_range(rgb_to_hsv8(rgb), self.config.hsv_lower, self.config.hsv_upper)
            && in_range(
                rgb_to_ycrcb(rgb),
                self.config.ycrcb_lower,
                self.config.ycrcb_upper,
            )
    }
}

/// Inclusive per-channel range test
fn in_range(value: [u8; 3], lower: [u8; 3], upper: [u8; 3]) -> bool {
    (0..3).all(|i| value[i] >= lower[i] && value[i] <= upper[i])
}
