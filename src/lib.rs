//! # Skin Tone Scan
//!
//! A Rust crate for analyzing and adjusting skin tones in photographs.
//!
//! This library provides:
//! - Skin region segmentation by combined HSV and YCrCb thresholding
//! - Dominant skin color extraction with deterministic k-means
//! - Classification by lightness, undertone, temperature and season
//! - Mask-guided lightness, warmth and saturation edits with feathering
//!
//! ## Example
//!
//! ```rust,no_run
//! use skin_tone_scan::analyze_image_file;
//! use std::path::Path;
//!
//! let analysis = analyze_image_file(Path::new("portrait.jpg"))?;
//! println!("{} / {} ({})", analysis.category, analysis.undertone, analysis.average_hex());
//! # Ok::<(), skin_tone_scan::AnalysisError>(())
//! ```

use std::path::Path;

use image::RgbImage;

pub mod error;
pub mod constants;
pub mod config;
pub mod detection;
pub mod color;
pub mod modification;
pub mod image_loader;

pub use config::AnalyzerConfig;
pub use color::{
    DominantColor, HarmonyInfo, Season, SkinCategory, SkinToneAnalysis, SkinToneAnalyzer,
    Temperature, Undertone,
};
pub use detection::{SkinDetector, SkinMask};
pub use error::{AnalysisError, Result};
pub use modification::{Adjustment, AdjustmentKind, ToneModifier, ToneTarget};

/// Detect skin in an image with the default thresholds
///
/// An all-zero mask is returned, not an error, when no skin is present.
///
/// # Errors
///
/// Returns `ConversionError` for an image with no pixels.
pub fn detect_skin(image: &RgbImage) -> Result<SkinMask> {
    SkinDetector::new().detect(image)
}

/// Analyze the skin tone of an in-memory image with default settings
///
/// # Errors
///
/// Returns `NoSkinDetected` when no skin is found and `AnalysisFailed`
/// for any other internal failure.
pub fn analyze_skin_tone(image: &RgbImage) -> Result<SkinToneAnalysis> {
    SkinToneAnalyzer::new().analyze(image)
}

/// Load, validate and analyze an image file
///
/// This is the main entry point for file-based analysis. The image is
/// checked against the upload limits and downscaled before analysis.
///
/// # Errors
///
/// Returns `AnalysisError` if:
/// - The file has a disallowed extension, is too large or cannot be decoded
/// - No skin is detected in the image
/// - The analysis fails internally
pub fn analyze_image_file(image_path: &Path) -> Result<SkinToneAnalysis> {
    analyze_image_file_with_config(image_path, &AnalyzerConfig::default())
}

/// Same as [`analyze_image_file`] with explicit configuration
pub fn analyze_image_file_with_config(
    image_path: &Path,
    config: &AnalyzerConfig,
) -> Result<SkinToneAnalysis> {
    let image = image_loader::load_image(image_path, &config.loader)?;
    SkinToneAnalyzer::with_config(config).analyze(&image)
}
