//! Mask-guided skin tone modification
//!
//! Every operation detects skin on its input, edits only pixels with
//! non-zero mask weight and returns a new image. An image without detected
//! skin comes back unchanged.

use std::fmt;
use std::str::FromStr;

use image::{Rgb, RgbImage};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::color::conversion::{hsv_to_rgb, lab_to_rgb, rgb_to_hsv, rgb_to_lab};
use crate::config::{AnalyzerConfig, ModificationConfig};
use crate::constants::{lightness as bounds, modification as limits};
use crate::detection::{SkinDetector, SkinMask};
use crate::modification::filters::{bilateral_filter, blend_with_mask, feather_mask};
use crate::{AnalysisError, Result};

/// Channel being adjusted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentKind {
    Lightness,
    Warmth,
    Saturation,
}

impl AdjustmentKind {
    pub fn name(self) -> &'static str {
        match self {
            AdjustmentKind::Lightness => "lightness",
            AdjustmentKind::Warmth => "warmth",
            AdjustmentKind::Saturation => "saturation",
        }
    }
}

impl fmt::Display for AdjustmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AdjustmentKind {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lightness" => Ok(AdjustmentKind::Lightness),
            "warmth" => Ok(AdjustmentKind::Warmth),
            "saturation" => Ok(AdjustmentKind::Saturation),
            _ => Err(AnalysisError::invalid_parameter("adjustment kind", s)),
        }
    }
}

/// A validated scalar adjustment in [-50, 50]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    kind: AdjustmentKind,
    value: f32,
}

impl Adjustment {
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `value` is not finite or lies outside
    /// [-50, 50].
    pub fn new(kind: AdjustmentKind, value: f32) -> Result<Self> {
        if !value.is_finite() || value.abs() > limits::MAX_MAGNITUDE {
            return Err(AnalysisError::invalid_parameter(kind.name(), value));
        }
        Ok(Self { kind, value })
    }

    pub fn lightness(value: f32) -> Result<Self> {
        Self::new(AdjustmentKind::Lightness, value)
    }

    pub fn warmth(value: f32) -> Result<Self> {
        Self::new(AdjustmentKind::Warmth, value)
    }

    pub fn saturation(value: f32) -> Result<Self> {
        Self::new(AdjustmentKind::Saturation, value)
    }

    pub fn kind(&self) -> AdjustmentKind {
        self.kind
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Edit a single skin pixel
    fn apply_to_pixel(&self, rgb: [u8; 3]) -> [u8; 3] {
        let m = self.value / 100.0;
        match self.kind {
            AdjustmentKind::Lightness => {
                let mut lab = rgb_to_lab(rgb);
                lab.l = (lab.l * (1.0 + m)).clamp(0.0, bounds::MAX);
                lab_to_rgb(lab)
            }
            AdjustmentKind::Warmth => {
                let (red_gain, blue_gain) = if m > 0.0 {
                    limits::WARM_GAIN
                } else {
                    limits::COOL_GAIN
                };
                let red = rgb[0] as f32 * (1.0 + red_gain * m);
                let blue = rgb[2] as f32 * (1.0 - blue_gain * m);
                [
                    red.clamp(0.0, 255.0) as u8,
                    rgb[1],
                    blue.clamp(0.0, 255.0) as u8,
                ]
            }
            AdjustmentKind::Saturation => {
                let mut hsv = rgb_to_hsv(rgb);
                hsv.saturation = (hsv.saturation * (1.0 + m)).clamp(0.0, 1.0);
                hsv_to_rgb(hsv)
            }
        }
    }
}

impl fmt::Display for Adjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:+}", self.kind, self.value)
    }
}

/// Named composite tone change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToneTarget {
    Lighter,
    Darker,
    Warmer,
    Cooler,
}

/// Lightness, warmth and saturation amounts of a composite tone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TonePreset {
    pub lightness: f32,
    pub warmth: f32,
    pub saturation: f32,
}

impl TonePreset {
    /// Non-zero steps in application order: lightness, warmth, saturation
    pub fn steps(&self) -> Result<Vec<Adjustment>> {
        [
            (AdjustmentKind::Lightness, self.lightness),
            (AdjustmentKind::Warmth, self.warmth),
            (AdjustmentKind::Saturation, self.saturation),
        ]
        .into_iter()
        .filter(|(_, value)| *value != 0.0)
        .map(|(kind, value)| Adjustment::new(kind, value))
        .collect()
    }
}

impl ToneTarget {
    pub const ALL: [ToneTarget; 4] = [
        ToneTarget::Lighter,
        ToneTarget::Darker,
        ToneTarget::Warmer,
        ToneTarget::Cooler,
    ];

    pub fn preset(self) -> TonePreset {
        let (lightness, warmth, saturation) = match self {
            ToneTarget::Lighter => (15.0, 0.0, -5.0),
            ToneTarget::Darker => (-15.0, 5.0, 5.0),
            ToneTarget::Warmer => (0.0, 20.0, 10.0),
            ToneTarget::Cooler => (0.0, -20.0, -5.0),
        };
        TonePreset {
            lightness,
            warmth,
            saturation,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ToneTarget::Lighter => "lighter",
            ToneTarget::Darker => "darker",
            ToneTarget::Warmer => "warmer",
            ToneTarget::Cooler => "cooler",
        }
    }
}

impl fmt::Display for ToneTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ToneTarget {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        ToneTarget::ALL
            .into_iter()
            .find(|target| target.name() == wanted)
            .ok_or_else(|| AnalysisError::UnknownTone { name: s.to_string() })
    }
}

/// Skin tone modifier operating on RGB images
#[derive(Debug, Clone)]
pub struct ToneModifier {
    detector: SkinDetector,
    config: ModificationConfig,
}

impl Default for ToneModifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ToneModifier {
    /// Create a modifier with default thresholds and a 5x5 mask blur
    pub fn new() -> Self {
        Self::with_config(&AnalyzerConfig::default())
    }

    /// Create a modifier from configuration
    pub fn with_config(config: &AnalyzerConfig) -> Self {
        let detector = SkinDetector::with_config(config.skin_detection.clone())
            .with_blur_kernel(config.modification.mask_blur_kernel);
        Self {
            detector,
            config: config.modification.clone(),
        }
    }

    /// Skin mask used to guide edits
    pub fn skin_mask(&self, image: &RgbImage) -> Result<SkinMask> {
        self.detector.detect(image)
    }

    /// Scale L* of skin pixels by `1 + value / 100`
    pub fn adjust_lightness(&self, image: &RgbImage, value: f32) -> Result<RgbImage> {
        self.apply(image, Adjustment::lightness(value)?)
    }

    /// Push skin pixels towards red (positive) or blue (negative)
    pub fn adjust_warmth(&self, image: &RgbImage, value: f32) -> Result<RgbImage> {
        self.apply(image, Adjustment::warmth(value)?)
    }

    /// Scale HSV saturation of skin pixels by `1 + value / 100`
    pub fn adjust_saturation(&self, image: &RgbImage, value: f32) -> Result<RgbImage> {
        self.apply(image, Adjustment::saturation(value)?)
    }

    /// Apply one adjustment to the skin pixels of `image`
    ///
    /// Non-skin pixels are copied verbatim.
    ///
    /// # Errors
    ///
    /// Returns `ConversionError` naming the adjustment if the image is malformed.
    pub fn apply(&self, image: &RgbImage, adjustment: Adjustment) -> Result<RgbImage> {
        let mask = self
            .skin_mask(image)
            .map_err(in_operation(adjustment.kind().name()))?;
        if mask.is_empty() {
            debug!("{}: no skin detected, image unchanged", adjustment);
            return Ok(image.clone());
        }

        let (width, height) = image.dimensions();
        let result = RgbImage::from_fn(width, height, |x, y| {
            let pixel = image.get_pixel(x, y).0;
            if mask.is_skin(x, y) {
                Rgb(adjustment.apply_to_pixel(pixel))
            } else {
                Rgb(pixel)
            }
        });
        debug!(
            "{} applied to {} skin pixels",
            adjustment,
            mask.skin_pixel_count()
        );
        Ok(result)
    }

    /// Apply a named composite tone such as `"warmer"`
    ///
    /// # Errors
    ///
    /// Returns `UnknownTone` for an unrecognized name, before any pixel is touched.
    pub fn change_skin_tone(&self, image: &RgbImage, target: &str) -> Result<RgbImage> {
        let target = ToneTarget::from_str(target)?;
        self.apply_tone(image, target)
    }

    /// Apply a composite tone: lightness, then warmth, then saturation
    ///
    /// Zero steps are skipped and each step detects skin on its own input.
    pub fn apply_tone(&self, image: &RgbImage, target: ToneTarget) -> Result<RgbImage> {
        let steps = target.preset().steps()?;
        let mut result = image.clone();
        for step in steps {
            debug!("{}: {}", target, step);
            result = self.apply(&result, step)?;
        }
        Ok(result)
    }

    /// Apply an adjustment blended through a feathered mask
    ///
    /// The mask is blurred with a `(2 * feather_radius + 1)` kernel and used
    /// as alpha between the original and the fully adjusted image. `None`
    /// uses the configured default radius.
    pub fn apply_gradual_adjustment(
        &self,
        image: &RgbImage,
        adjustment: Adjustment,
        feather_radius: Option<u32>,
    ) -> Result<RgbImage> {
        let mask = self
            .skin_mask(image)
            .map_err(in_operation("gradual adjustment"))?;
        if mask.is_empty() {
            return Ok(image.clone());
        }

        let radius = feather_radius.unwrap_or(self.config.feather_radius);
        let feathered = feather_mask(&mask, radius);
        let adjusted = self.apply(image, adjustment)?;
        debug!("{} feathered with radius {}", adjustment, radius);

        blend_with_mask(image, &adjusted, &feathered, 1.0)
            .map_err(in_operation("gradual adjustment"))
    }

    /// Smooth skin texture at the configured default intensity
    pub fn smooth_skin(&self, image: &RgbImage) -> Result<RgbImage> {
        self.enhance_skin_texture(image, self.config.smoothing_intensity)
    }

    /// Smooth skin texture with a bilateral filter
    ///
    /// The filtered image is blended in with alpha `mask_weight * intensity`,
    /// `intensity` clamped to [0,1].
    pub fn enhance_skin_texture(&self, image: &RgbImage, intensity: f32) -> Result<RgbImage> {
        if !intensity.is_finite() {
            return Err(AnalysisError::invalid_parameter("smoothing intensity", intensity));
        }
        let intensity = intensity.clamp(0.0, 1.0);

        let mask = self
            .skin_mask(image)
            .map_err(in_operation("texture smoothing"))?;
        if mask.is_empty() || intensity == 0.0 {
            return Ok(image.clone());
        }

        let smoothed = bilateral_filter(
            image,
            self.config.bilateral_diameter,
            self.config.bilateral_sigma_color,
            self.config.bilateral_sigma_space,
        );
        blend_with_mask(image, &smoothed, &mask, intensity).map_err(in_operation("texture smoothing"))
    }
}

/// Prefix conversion failures with the operation that hit them
fn in_operation(operation: &'static str) -> impl Fn(AnalysisError) -> AnalysisError {
    move |err| match err {
        AnalysisError::ConversionError { message } => {
            AnalysisError::conversion(format!("{} failed: {}", operation, message))
        }
        other => other,
    }
}
