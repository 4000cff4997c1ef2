//! Image loading with upload validation
//!
//! This module provides the single entry point for turning a file or an
//! uploaded byte buffer into the RGB image the detector and analyzer expect.
//!
//! ## Supported Formats
//!
//! - JPEG (`jpg`, `jpeg`)
//! - PNG
//! - WebP
//!
//! ## Design
//!
//! Files are checked against the [`LoaderConfig`] limits (extension and byte
//! size) before decoding. Decoded images are converted to RGB8 and shrunk to
//! fit the configured maximum dimension with Lanczos3, keeping aspect ratio.

use std::fs::File;
use std::io::{BufWriter, Cursor};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader, RgbImage};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::LoaderConfig;
use crate::error::{AnalysisError, Result};

/// JPEG quality used when saving results
const JPEG_QUALITY: u8 = 85;

/// Supported image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// JPEG image
    Jpeg,
    /// PNG image
    Png,
    /// WebP image
    WebP,
}

impl ImageFormat {
    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<ImageFormat> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            "webp" => Some(ImageFormat::WebP),
            _ => None,
        }
    }

    fn codec(self) -> image::ImageFormat {
        match self {
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::WebP => image::ImageFormat::WebP,
        }
    }
}

/// Summary statistics over all channels of an image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageStats {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub total_pixels: usize,
    pub mean_brightness: f32,
    pub std_brightness: f32,
    pub min_value: u8,
    pub max_value: u8,
}

/// Load an image from disk as RGB, enforcing upload limits
///
/// # Errors
///
/// Returns `AnalysisError::ImageLoadError` if:
/// - The extension is not in `config.allowed_extensions`
/// - The file exceeds `config.max_file_bytes`
/// - The file cannot be opened or decoded
///
/// # Example
///
/// ```rust,no_run
/// use skin_tone_scan::config::LoaderConfig;
/// use skin_tone_scan::image_loader::load_image;
/// use std::path::Path;
///
/// let image = load_image(Path::new("portrait.jpg"), &LoaderConfig::default())?;
/// println!("Loaded image: {}x{}", image.width(), image.height());
/// # Ok::<(), skin_tone_scan::AnalysisError>(())
/// ```
pub fn load_image(path: &Path, config: &LoaderConfig) -> Result<RgbImage> {
    validate_extension(path, config)?;

    let metadata = std::fs::metadata(path).map_err(|e| {
        AnalysisError::image_load(format!("Failed to open image file: {}", path.display()), e)
    })?;
    validate_size(metadata.len(), config)?;

    let decoded = ImageReader::open(path)
        .map_err(|e| {
            AnalysisError::image_load(format!("Failed to open image file: {}", path.display()), e)
        })?
        .with_guessed_format()
        .map_err(|e| {
            AnalysisError::image_load(format!("Failed to read image file: {}", path.display()), e)
        })?
        .decode()
        .map_err(|e| {
            AnalysisError::image_load(format!("Failed to decode image: {}", path.display()), e)
        })?;

    Ok(prepare(decoded, config))
}

/// Decode an uploaded byte buffer as RGB, enforcing the size limit
///
/// The format is guessed from the content.
pub fn load_image_from_bytes(bytes: &[u8], config: &LoaderConfig) -> Result<RgbImage> {
    validate_size(bytes.len() as u64, config)?;

    let decoded = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| AnalysisError::image_load("Failed to read image bytes", e))?
        .decode()
        .map_err(|e| AnalysisError::image_load("Failed to decode image bytes", e))?;

    Ok(prepare(decoded, config))
}

/// Save an image in the format implied by the path extension
///
/// JPEG output uses quality 85.
pub fn save_image(image: &RgbImage, path: &Path) -> Result<()> {
    let format = ImageFormat::from_extension(path).ok_or_else(|| AnalysisError::ImageLoadError {
        message: format!("Unsupported output format: {}", path.display()),
        source: None,
    })?;

    match format {
        ImageFormat::Jpeg => {
            let file = File::create(path).map_err(|e| {
                AnalysisError::image_load(format!("Failed to create {}", path.display()), e)
            })?;
            let mut encoder = JpegEncoder::new_with_quality(BufWriter::new(file), JPEG_QUALITY);
            encoder.encode_image(image).map_err(|e| {
                AnalysisError::image_load(format!("Failed to encode {}", path.display()), e)
            })?;
        }
        other => {
            image
                .save_with_format(path, other.codec())
                .map_err(|e| {
                    AnalysisError::image_load(format!("Failed to write {}", path.display()), e)
                })?;
        }
    }
    debug!("saved {}x{} image to {}", image.width(), image.height(), path.display());
    Ok(())
}

/// Shrink an image to fit within `max_dimension` on both sides
///
/// Images already small enough are returned unchanged.
pub fn downscale(image: RgbImage, max_dimension: u32) -> RgbImage {
    let (width, height) = image.dimensions();
    if max_dimension == 0 || (width <= max_dimension && height <= max_dimension) {
        return image;
    }

    let scale = f64::min(
        max_dimension as f64 / width as f64,
        max_dimension as f64 / height as f64,
    );
    let new_width = ((width as f64 * scale).round() as u32).clamp(1, max_dimension);
    let new_height = ((height as f64 * scale).round() as u32).clamp(1, max_dimension);
    debug!(
        "downscaling {}x{} to {}x{}",
        width, height, new_width, new_height
    );
    image::imageops::resize(&image, new_width, new_height, FilterType::Lanczos3)
}

/// Compute summary statistics of an image
pub fn image_stats(image: &RgbImage) -> ImageStats {
    let (width, height) = image.dimensions();
    let raw = image.as_raw();

    let (mean, std, min, max) = if raw.is_empty() {
        (0.0, 0.0, 0, 0)
    } else {
        let n = raw.len() as f64;
        let mean = raw.iter().map(|&v| v as f64).sum::<f64>() / n;
        let variance = raw
            .iter()
            .map(|&v| {
                let d = v as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n;
        let min = raw.iter().copied().min().unwrap_or(0);
        let max = raw.iter().copied().max().unwrap_or(0);
        (mean, variance.sqrt(), min, max)
    };

    ImageStats {
        width,
        height,
        channels: 3,
        total_pixels: width as usize * height as usize,
        mean_brightness: mean as f32,
        std_brightness: std as f32,
        min_value: min,
        max_value: max,
    }
}

/// Check if a file extension is accepted by the loader configuration
pub fn is_allowed_extension(ext: &str, config: &LoaderConfig) -> bool {
    let ext_lower = ext.to_lowercase();
    config.allowed_extensions.iter().any(|allowed| *allowed == ext_lower)
}

fn validate_extension(path: &Path, config: &LoaderConfig) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    if !is_allowed_extension(ext, config) {
        return Err(AnalysisError::ImageLoadError {
            message: format!(
                "Unsupported file type '{}'; allowed: {}",
                ext,
                config.allowed_extensions.join(", ")
            ),
            source: None,
        });
    }
    Ok(())
}

fn validate_size(bytes: u64, config: &LoaderConfig) -> Result<()> {
    if bytes > config.max_file_bytes {
        return Err(AnalysisError::ImageLoadError {
            message: format!(
                "File is {} bytes; the limit is {} bytes",
                bytes, config.max_file_bytes
            ),
            source: None,
        });
    }
    Ok(())
}

fn prepare(decoded: DynamicImage, config: &LoaderConfig) -> RgbImage {
    downscale(decoded.to_rgb8(), config.max_dimension)
}
