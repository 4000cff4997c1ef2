//! Configuration structures for the skin tone pipeline.
//!
//! This module defines all tunable parameters, organized into groups for
//! detection, clustering, modification and image loading.
//!
//! # Configuration Loading
//!
//! Configuration can be loaded from JSON files or constructed programmatically:
//!
//! ```no_run
//! use skin_tone_scan::AnalyzerConfig;
//! use std::path::Path;
//!
//! // Load from file
//! let config = AnalyzerConfig::from_json_file(Path::new("config.json"))?;
//!
//! // Or use defaults
//! let config = AnalyzerConfig::default();
//! # Ok::<(), skin_tone_scan::AnalysisError>(())
//! ```
//!
//! # Configuration Sections
//!
//! - [`SkinDetectionConfig`]: color ranges and mask cleanup
//! - [`ClusteringConfig`]: dominant color k-means parameters
//! - [`ModificationConfig`]: feathering and smoothing parameters
//! - [`LoaderConfig`]: upload limits and downscaling

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::{clustering, loader, modification, morphology, skin};
use crate::error::{AnalysisError, Result};

/// Complete configuration for analysis and modification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Skin segmentation configuration
    pub skin_detection: SkinDetectionConfig,

    /// Dominant color clustering configuration
    pub clustering: ClusteringConfig,

    /// Tone modification configuration
    pub modification: ModificationConfig,

    /// Image loading configuration
    #[serde(default)]
    pub loader: LoaderConfig,
}

/// Skin segmentation parameters.
///
/// A pixel is skin only when it lies inside both the HSV and the YCrCb
/// ranges (all bounds inclusive, 8-bit scales).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinDetectionConfig {
    /// HSV lower bound (H in [0,180))
    pub hsv_lower: [u8; 3],

    /// HSV upper bound
    pub hsv_upper: [u8; 3],

    /// YCrCb lower bound
    pub ycrcb_lower: [u8; 3],

    /// YCrCb upper bound
    pub ycrcb_upper: [u8; 3],

    /// Elliptical structuring element radius for opening and closing
    pub ellipse_radius: u32,

    /// Gaussian kernel size applied to the cleaned mask (must be odd)
    pub blur_kernel: u32,
}

/// Dominant color extraction parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusteringConfig {
    /// Number of dominant colors to report
    pub dominant_colors: usize,

    /// Seed of the first restart
    pub seed: u64,

    /// Number of independent restarts
    pub restarts: usize,

    /// Maximum Lloyd iterations per restart
    pub max_iterations: usize,
}

/// Tone modification parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModificationConfig {
    /// Gaussian kernel size for the modifier's skin mask (must be odd)
    pub mask_blur_kernel: u32,

    /// Default feather radius for gradual adjustments
    pub feather_radius: u32,

    /// Bilateral filter neighbourhood diameter
    pub bilateral_diameter: u32,

    /// Bilateral filter range sigma
    pub bilateral_sigma_color: f32,

    /// Bilateral filter spatial sigma
    pub bilateral_sigma_space: f32,

    /// Default texture smoothing intensity in [0,1]
    pub smoothing_intensity: f32,
}

/// Upload limits enforced before an image reaches the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Maximum file size in bytes
    pub max_file_bytes: u64,

    /// Longest allowed side after downscaling
    pub max_dimension: u32,

    /// Accepted lowercase file extensions
    pub allowed_extensions: Vec<String>,
}

impl Default for SkinDetectionConfig {
    fn default() -> Self {
        Self {
            hsv_lower: skin::HSV_LOWER,
            hsv_upper: skin::HSV_UPPER,
            ycrcb_lower: skin::YCRCB_LOWER,
            ycrcb_upper: skin::YCRCB_UPPER,
            ellipse_radius: morphology::ELLIPSE_RADIUS,
            blur_kernel: morphology::ANALYSIS_BLUR_KERNEL,
        }
    }
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            dominant_colors: clustering::DOMINANT_COLORS,
            seed: clustering::SEED,
            restarts: clustering::RESTARTS,
            max_iterations: clustering::MAX_ITERATIONS,
        }
    }
}

impl Default for ModificationConfig {
    fn default() -> Self {
        Self {
            mask_blur_kernel: morphology::MODIFIER_BLUR_KERNEL,
            feather_radius: modification::FEATHER_RADIUS,
            bilateral_diameter: modification::BILATERAL_DIAMETER,
            bilateral_sigma_color: modification::BILATERAL_SIGMA_COLOR,
            bilateral_sigma_space: modification::BILATERAL_SIGMA_SPACE,
            smoothing_intensity: modification::SMOOTHING,
        }
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: loader::MAX_FILE_BYTES,
            max_dimension: loader::MAX_DIMENSION,
            allowed_extensions: loader::ALLOWED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            skin_detection: SkinDetectionConfig::default(),
            clustering: ClusteringConfig::default(),
            modification: ModificationConfig::default(),
            loader: LoaderConfig::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AnalysisError::config(format!("cannot read {}", path.display()), e)
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            AnalysisError::config(format!("cannot parse {}", path.display()), e)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AnalysisError::config("cannot serialize configuration", e))?;
        std::fs::write(path, json).map_err(|e| {
            AnalysisError::config(format!("cannot write {}", path.display()), e)
        })?;
        Ok(())
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        let det = &self.skin_detection;
        for i in 0..3 {
            if det.hsv_lower[i] > det.hsv_upper[i] {
                return Err(invalid("skin_detection.hsv_lower", det.hsv_lower[i]));
            }
            if det.ycrcb_lower[i] > det.ycrcb_upper[i] {
                return Err(invalid("skin_detection.ycrcb_lower", det.ycrcb_lower[i]));
            }
        }
        if det.blur_kernel % 2 == 0 || det.blur_kernel > morphology::MAX_KERNEL_SIZE {
            return Err(invalid("skin_detection.blur_kernel", det.blur_kernel));
        }
        if det.ellipse_radius > morphology::MAX_ELLIPSE_RADIUS {
            return Err(invalid("skin_detection.ellipse_radius", det.ellipse_radius));
        }
        let modifier = &self.modification;
        if modifier.mask_blur_kernel % 2 == 0
            || modifier.mask_blur_kernel > morphology::MAX_KERNEL_SIZE
        {
            return Err(invalid(
                "modification.mask_blur_kernel",
                modifier.mask_blur_kernel,
            ));
        }
        if !(0.0..=1.0).contains(&modifier.smoothing_intensity) {
            return Err(invalid(
                "modification.smoothing_intensity",
                modifier.smoothing_intensity,
            ));
        }
        if modifier.bilateral_diameter == 0
            || modifier.bilateral_diameter > morphology::MAX_KERNEL_SIZE
        {
            return Err(invalid(
                "modification.bilateral_diameter",
                modifier.bilateral_diameter,
            ));
        }
        if self.clustering.dominant_colors == 0 {
            return Err(invalid("clustering.dominant_colors", 0));
        }
        if self.clustering.restarts == 0 {
            return Err(invalid("clustering.restarts", 0));
        }
        if self.clustering.max_iterations == 0 {
            return Err(invalid("clustering.max_iterations", 0));
        }
        Ok(())
    }
}

fn invalid(parameter: &str, value: impl ToString) -> AnalysisError {
    AnalysisError::ConfigError {
        message: format!("invalid value {} for {}", value.to_string(), parameter),
        source: None,
    }
}
