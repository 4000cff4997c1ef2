//! Color space conversion utilities
//!
//! Provides per-pixel and per-image conversions between:
//! - RGB and 8-bit HSV (H in [0,180), S and V in [0,255]) for skin thresholds
//! - RGB and 8-bit YCrCb for skin thresholds
//! - RGB and CIE L*a*b* (D65) for lightness
//! - RGB and floating HSV (hue in degrees, S and V in [0,1]) for harmony and saturation edits
//! - Hexadecimal color representation

use image::{Rgb, RgbImage};
use palette::{FromColor, Hsv, Lab, Srgb};

use crate::{AnalysisError, Result};

/// Convert an RGB pixel to 8-bit HSV
///
/// Hue is stored as degrees / 2 so that a full turn fits into a byte.
pub fn rgb_to_hsv8(rgb: [u8; 3]) -> [u8; 3] {
    let r = rgb[0] as f32;
    let g = rgb[1] as f32;
    let b = rgb[2] as f32;

    let v = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = v - min;

    let s = if v > 0.0 { diff * 255.0 / v } else { 0.0 };

    let h = if diff == 0.0 {
        0.0
    } else if v == r {
        60.0 * (g - b) / diff
    } else if v == g {
        120.0 + 60.0 * (b - r) / diff
    } else {
        240.0 + 60.0 * (r - g) / diff
    };
    let h = if h < 0.0 { h + 360.0 } else { h };

    let h8 = ((h / 2.0).round() as u32 % 180) as u8;
    [h8, s.round().min(255.0) as u8, v as u8]
}

/// Convert an RGB pixel to 8-bit YCrCb
pub fn rgb_to_ycrcb(rgb: [u8; 3]) -> [u8; 3] {
    let r = rgb[0] as f32;
    let g = rgb[1] as f32;
    let b = rgb[2] as f32;

    let y = 0.299 * r + 0.587 * g + 0.114 * b;
    let cr = (r - y) * 0.713 + 128.0;
    let cb = (b - y) * 0.564 + 128.0;

    [to_byte(y), to_byte(cr), to_byte(cb)]
}

/// Convert RGB (0-255) to Lab color space under D65
pub fn rgb_to_lab(rgb: [u8; 3]) -> Lab {
    Lab::from_color(srgb_from_bytes(rgb))
}

/// Convert a floating-point RGB triple (0-255 scale) to Lab
///
/// # Errors
///
/// Returns `ConversionError` if the input or the result is not finite.
pub fn rgb_f32_to_lab(rgb: [f32; 3]) -> Result<Lab> {
    if rgb.iter().any(|c| !c.is_finite()) {
        return Err(AnalysisError::conversion(format!(
            "non-finite RGB triple {:?}",
            rgb
        )));
    }
    let lab = Lab::from_color(Srgb::new(rgb[0] / 255.0, rgb[1] / 255.0, rgb[2] / 255.0));
    if !(lab.l.is_finite() && lab.a.is_finite() && lab.b.is_finite()) {
        return Err(AnalysisError::conversion("Lab conversion produced NaN"));
    }
    Ok(lab)
}

/// Convert Lab back to 8-bit RGB, clamped to the sRGB gamut
pub fn lab_to_rgb(lab: Lab) -> [u8; 3] {
    srgb_to_bytes(Srgb::from_color(lab))
}

/// Convert an RGB pixel to floating HSV
pub fn rgb_to_hsv(rgb: [u8; 3]) -> Hsv {
    Hsv::from_color(srgb_from_bytes(rgb))
}

/// Convert a floating-point RGB triple (0-255 scale) to floating HSV
pub fn rgb_f32_to_hsv(rgb: [f32; 3]) -> Hsv {
    Hsv::from_color(Srgb::new(rgb[0] / 255.0, rgb[1] / 255.0, rgb[2] / 255.0))
}

/// Convert floating HSV back to 8-bit RGB
pub fn hsv_to_rgb(hsv: Hsv) -> [u8; 3] {
    srgb_to_bytes(Srgb::from_color(hsv))
}

/// Convert an RGB image to an 8-bit HSV image (channels H, S, V)
///
/// # Errors
///
/// Returns `ConversionError` for an image with no pixels.
pub fn to_hsv_image(image: &RgbImage) -> Result<RgbImage> {
    map_image(image, "HSV", rgb_to_hsv8)
}

/// Convert an RGB image to an 8-bit YCrCb image (channels Y, Cr, Cb)
///
/// # Errors
///
/// Returns `ConversionError` for an image with no pixels.
pub fn to_ycrcb_image(image: &RgbImage) -> Result<RgbImage> {
    map_image(image, "YCrCb", rgb_to_ycrcb)
}

/// Reject images that no color transform can be applied to
pub fn ensure_valid(image: &RgbImage) -> Result<()> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(AnalysisError::conversion(format!(
            "image has no pixels ({}x{})",
            width, height
        )));
    }
    Ok(())
}

/// Convert RGB bytes to a hexadecimal color string (e.g. "#FF0000")
pub fn rgb_to_hex(rgb: [u8; 3]) -> String {
    format!("#{:02X}{:02X}{:02X}", rgb[0], rgb[1], rgb[2])
}

/// Parse hexadecimal color string to RGB bytes
///
/// Accepts "#RRGGBB" or "RRGGBB".
///
/// # Errors
///
/// Returns `ConversionError` if the string is not six hex digits
pub fn hex_to_rgb(hex: &str) -> Result<[u8; 3]> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(AnalysisError::conversion(format!(
            "invalid hex color: expected 6 characters, got '{}'",
            hex
        )));
    }

    let mut rgb = [0u8; 3];
    for (i, channel) in rgb.iter_mut().enumerate() {
        *channel = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
            .map_err(|e| AnalysisError::conversion(format!("invalid hex digit: {}", e)))?;
    }
    Ok(rgb)
}

fn map_image(image: &RgbImage, target: &str, f: fn([u8; 3]) -> [u8; 3]) -> Result<RgbImage> {
    ensure_valid(image).map_err(|e| {
        AnalysisError::conversion(format!("RGB to {} conversion failed: {}", target, e))
    })?;
    let (width, height) = image.dimensions();
    Ok(RgbImage::from_fn(width, height, |x, y| {
        Rgb(f(image.get_pixel(x, y).0))
    }))
}

fn srgb_from_bytes(rgb: [u8; 3]) -> Srgb {
    Srgb::new(
        rgb[0] as f32 / 255.0,
        rgb[1] as f32 / 255.0,
        rgb[2] as f32 / 255.0,
    )
}

fn srgb_to_bytes(srgb: Srgb) -> [u8; 3] {
    [
        unit_to_byte(srgb.red),
        unit_to_byte(srgb.green),
        unit_to_byte(srgb.blue),
    ]
}

fn unit_to_byte(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn to_byte(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsv8_primaries() {
        assert_eq!(rgb_to_hsv8([255, 0, 0]), [0, 255, 255]);
        assert_eq!(rgb_to_hsv8([0, 255, 0]), [60, 255, 255]);
        assert_eq!(rgb_to_hsv8([0, 0, 255]), [120, 255, 255]);
    }

    #[test]
    fn test_hsv8_gray_has_no_hue_or_saturation() {
        assert_eq!(rgb_to_hsv8([128, 128, 128]), [0, 0, 128]);
        assert_eq!(rgb_to_hsv8([0, 0, 0]), [0, 0, 0]);
    }

    #[test]
    fn test_hsv8_skin_like_color() {
        // A typical light skin tone sits at roughly 15 degrees of hue
        let hsv = rgb_to_hsv8([224, 172, 150]);
        assert!(hsv[0] <= 20);
        assert!(hsv[1] >= 20);
        assert!(hsv[2] >= 70);
    }

    #[test]
    fn test_hsv8_wraps_near_red() {
        // Hue of 359 degrees rounds to 180 and wraps back to 0
        let hsv = rgb_to_hsv8([255, 0, 4]);
        assert!(hsv[0] < 180);
    }

    #[test]
    fn test_ycrcb_white_and_black() {
        assert_eq!(rgb_to_ycrcb([255, 255, 255]), [255, 128, 128]);
        assert_eq!(rgb_to_ycrcb([0, 0, 0]), [0, 128, 128]);
    }

    #[test]
    fn test_ycrcb_red_pushes_cr() {
        let ycrcb = rgb_to_ycrcb([255, 0, 0]);
        assert_eq!(ycrcb[0], 76);
        assert!(ycrcb[1] > 200);
        assert!(ycrcb[2] < 128);
    }

    #[test]
    fn test_rgb_to_lab_black_and_white() {
        assert!(rgb_to_lab([0, 0, 0]).l < 1.0);
        let white = rgb_to_lab([255, 255, 255]);
        assert!(white.l > 99.0);
        assert!(white.a.abs() < 1.0);
        assert!(white.b.abs() < 1.0);
    }

    #[test]
    fn test_lab_roundtrip_is_lossless_after_rounding() {
        for rgb in [[224, 172, 150], [141, 85, 36], [12, 200, 90], [255, 255, 255]] {
            let back = lab_to_rgb(rgb_to_lab(rgb));
            for i in 0..3 {
                assert!((back[i] as i16 - rgb[i] as i16).abs() <= 1, "{:?} -> {:?}", rgb, back);
            }
        }
    }

    #[test]
    fn test_hsv_roundtrip() {
        let rgb = [198, 134, 66];
        let back = hsv_to_rgb(rgb_to_hsv(rgb));
        for i in 0..3 {
            assert!((back[i] as i16 - rgb[i] as i16).abs() <= 1);
        }
    }

    #[test]
    fn test_rgb_f32_to_lab_rejects_nan() {
        assert!(rgb_f32_to_lab([f32::NAN, 0.0, 0.0]).is_err());
        assert!(rgb_f32_to_lab([128.0, 128.0, 128.0]).is_ok());
    }

    #[test]
    fn test_image_conversion_rejects_empty_image() {
        let empty = RgbImage::new(0, 0);
        assert!(matches!(
            to_hsv_image(&empty),
            Err(AnalysisError::ConversionError { .. })
        ));
        assert!(to_ycrcb_image(&empty).is_err());
    }

    #[test]
    fn test_image_conversion_preserves_dimensions() {
        let image = RgbImage::from_pixel(4, 3, Rgb([224, 172, 150]));
        let hsv = to_hsv_image(&image).unwrap();
        assert_eq!(hsv.dimensions(), (4, 3));
        assert_eq!(hsv.get_pixel(2, 1).0, rgb_to_hsv8([224, 172, 150]));
    }

    #[test]
    fn test_hex_roundtrip() {
        assert_eq!(rgb_to_hex([255, 0, 0]), "#FF0000");
        assert_eq!(hex_to_rgb("#E0AC96").unwrap(), [224, 172, 150]);
        assert_eq!(hex_to_rgb("00ff00").unwrap(), [0, 255, 0]);
    }

    #[test]
    fn test_hex_invalid() {
        assert!(hex_to_rgb("#FF").is_err());
        assert!(hex_to_rgb("#GGGGGG").is_err());
    }
}
