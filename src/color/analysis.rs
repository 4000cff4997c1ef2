//! Skin tone analysis
//!
//! Composes skin detection and dominant color extraction into a single
//! record describing the skin in an image:
//! - Lightness category from the L* of the mean skin color
//! - Undertone and color temperature from the red/blue balance
//! - Hue harmonies (complementary, triadic, analogous)
//! - Confidence from the fraction of the image covered by skin

use image::RgbImage;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::color::classification::{Season, SkinCategory, Temperature, Undertone};
use crate::color::conversion::{rgb_f32_to_hsv, rgb_f32_to_lab, rgb_to_hex};
use crate::color::dominant::{DominantColor, DominantColorExtractor};
use crate::config::AnalyzerConfig;
use crate::constants::{confidence as conf, lightness as bounds};
use crate::detection::{SkinDetector, SkinMask};
use crate::{AnalysisError, Result};

/// Hue relationships of the mean skin color
///
/// Hues are in degrees [0,360); saturation and value are on a 0-1 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HarmonyInfo {
    pub hue: f32,
    pub complementary: f32,
    pub triadic: [f32; 2],
    pub analogous: [f32; 2],
    pub saturation: f32,
    pub value: f32,
}

impl HarmonyInfo {
    /// Derive harmonies from a mean color on the 0-255 scale
    pub fn from_mean_color(rgb: [f32; 3]) -> Self {
        let hsv = rgb_f32_to_hsv(rgb);
        let hue = wrap_degrees(hsv.hue.into_positive_degrees());

        Self {
            hue,
            complementary: wrap_degrees(hue + 180.0),
            triadic: [wrap_degrees(hue + 120.0), wrap_degrees(hue + 240.0)],
            analogous: [wrap_degrees(hue + 30.0), wrap_degrees(hue - 30.0)],
            saturation: hsv.saturation,
            value: hsv.value,
        }
    }
}

/// Complete skin tone analysis of one image state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinToneAnalysis {
    /// Lightness bucket
    pub category: SkinCategory,
    /// Cool, warm or neutral cast
    pub undertone: Undertone,
    /// L* of the mean skin color, in [0,100]
    pub lightness: f32,
    pub temperature: Temperature,
    /// Up to five cluster centroids, most common first
    pub dominant_colors: Vec<DominantColor>,
    /// Mean skin color on the 0-255 scale
    pub average_color: [f32; 3],
    pub harmony_info: HarmonyInfo,
    /// Pixels with any skin membership
    pub skin_pixel_count: usize,
    /// Reliability score in [0,1]
    pub confidence: f32,
    pub season: Season,
}

impl SkinToneAnalysis {
    /// Mean skin color as `#RRGGBB`
    pub fn average_hex(&self) -> String {
        rgb_to_hex(self.average_color.map(|c| c.round().clamp(0.0, 255.0) as u8))
    }

    /// Dominant colors as `#RRGGBB`, most common first
    pub fn dominant_hex(&self) -> Vec<String> {
        self.dominant_colors
            .iter()
            .map(|c| rgb_to_hex(c.rgb))
            .collect()
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| AnalysisError::AnalysisFailed { source: Box::new(e) })
    }
}

/// Analyzer combining skin detection, clustering and classification
#[derive(Debug, Clone)]
pub struct SkinToneAnalyzer {
    detector: SkinDetector,
    extractor: DominantColorExtractor,
    dominant_colors: usize,
}

impl Default for SkinToneAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SkinToneAnalyzer {
    /// Create an analyzer with default thresholds and k=5
    pub fn new() -> Self {
        Self::with_config(&AnalyzerConfig::default())
    }

    /// Create an analyzer from configuration
    pub fn with_config(config: &AnalyzerConfig) -> Self {
        Self {
            detector: SkinDetector::with_config(config.skin_detection.clone()),
            extractor: DominantColorExtractor::with_config(&config.clustering),
            dominant_colors: config.clustering.dominant_colors.max(1),
        }
    }

    pub fn detector(&self) -> &SkinDetector {
        &self.detector
    }

    /// Analyze the skin in an image
    ///
    /// # Errors
    ///
    /// - `NoSkinDetected` when the skin mask is entirely zero
    /// - `AnalysisFailed` wrapping any other internal failure
    pub fn analyze(&self, image: &RgbImage) -> Result<SkinToneAnalysis> {
        let mask = self
            .detector
            .detect(image)
            .map_err(AnalysisError::into_analysis_failure)?;
        self.analyze_with_mask(image, &mask)
    }

    /// Analyze an image against a precomputed skin mask
    ///
    /// # Errors
    ///
    /// Same as [`SkinToneAnalyzer::analyze`]; a mask that does not match the
    /// image dimensions is reported as `AnalysisFailed`.
    pub fn analyze_with_mask(&self, image: &RgbImage, mask: &SkinMask) -> Result<SkinToneAnalysis> {
        if mask.is_empty() {
            return Err(AnalysisError::NoSkinDetected);
        }
        self.compose(image, mask)
            .map_err(AnalysisError::into_analysis_failure)
    }

    fn compose(&self, image: &RgbImage, mask: &SkinMask) -> Result<SkinToneAnalysis> {
        let pixels = mask.skin_pixels(image)?;
        if pixels.is_empty() {
            return Err(AnalysisError::NoSkinDetected);
        }

        let distinct = DominantColorExtractor::distinct_colors(&pixels);
        let k = self.dominant_colors.min(distinct);
        if k < self.dominant_colors {
            debug!("only {} distinct skin colors, reducing k to {}", distinct, k);
        }
        let dominant_colors = self.extractor.extract(&pixels, k)?;

        let average_color = mean_color(&pixels);
        let lightness = lightness_of(average_color);
        let category = SkinCategory::from_lightness(lightness);
        let undertone = Undertone::from_mean_color(average_color);
        let temperature = Temperature::from_mean_color(average_color);
        let harmony_info = HarmonyInfo::from_mean_color(average_color);
        let season = Season::from_undertone(undertone, lightness);

        let (width, height) = image.dimensions();
        let total = width as usize * height as usize;
        let skin_pixel_count = pixels.len();
        let confidence = confidence_for_ratio(skin_pixel_count as f32 / total as f32);

        debug!(
            "skin tone: {} / {} (L* {:.1}), {} skin pixels, confidence {:.2}",
            category, undertone, lightness, skin_pixel_count, confidence
        );

        Ok(SkinToneAnalysis {
            category,
            undertone,
            lightness,
            temperature,
            dominant_colors,
            average_color,
            harmony_info,
            skin_pixel_count,
            confidence,
            season,
        })
    }
}

/// Confidence score for the fraction of the image classified as skin
///
/// Lower bounds are inclusive: exactly 5% skin scores 0.6. Very large
/// ratios score below the ideal band since they usually include background.
pub fn confidence_for_ratio(ratio: f32) -> f32 {
    let score = if ratio < conf::SPARSE_RATIO {
        conf::SPARSE
    } else if ratio < conf::MODERATE_RATIO {
        conf::MODERATE
    } else if ratio < conf::EXCESSIVE_RATIO {
        conf::IDEAL
    } else {
        conf::EXCESSIVE
    };
    score.clamp(0.0, 1.0)
}

/// L* of a mean color, falling back to mean brightness when LAB fails
pub fn lightness_of(rgb: [f32; 3]) -> f32 {
    let lightness = match rgb_f32_to_lab(rgb) {
        Ok(lab) => lab.l,
        Err(err) => {
            debug!("LAB conversion failed ({}), using mean brightness", err);
            let mean = (rgb[0] + rgb[1] + rgb[2]) / 3.0;
            if mean.is_finite() {
                mean / 255.0 * bounds::MAX
            } else {
                0.0
            }
        }
    };
    lightness.clamp(0.0, bounds::MAX)
}

/// Arithmetic mean of a pixel set on the 0-255 scale
pub fn mean_color(pixels: &[[u8; 3]]) -> [f32; 3] {
    if pixels.is_empty() {
        return [0.0; 3];
    }
    let mut sum = [0.0f64; 3];
    for p in pixels {
        for c in 0..3 {
            sum[c] += p[c] as f64;
        }
    }
    let n = pixels.len() as f64;
    sum.map(|s| (s / n) as f32)
}

fn wrap_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}
