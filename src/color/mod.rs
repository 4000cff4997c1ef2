//! Color analysis and conversion module
//!
//! This module handles color space conversions, dominant color clustering
//! and classification of skin tones by lightness and undertone.

pub mod conversion;
pub mod dominant;
pub mod classification;
pub mod analysis;

pub use analysis::{HarmonyInfo, SkinToneAnalysis, SkinToneAnalyzer};
pub use classification::{Season, SkinCategory, Temperature, Undertone};
pub use dominant::{DominantColor, DominantColorExtractor};
