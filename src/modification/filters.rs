//! Image filters used by the tone modifier
//!
//! - Bilateral smoothing that preserves edges while flattening texture
//! - Gaussian feathering of skin masks
//! - Per-pixel alpha blending of two congruent images

use image::{Rgb, RgbImage};

use crate::detection::morphology::{gaussian_blur, reflect_101};
use crate::detection::SkinMask;
use crate::{AnalysisError, Result};

/// Edge-preserving bilateral filter over a circular neighbourhood
///
/// Spatial weights fall off with distance from the centre pixel (sigma
/// `sigma_space` in pixels), range weights with the summed absolute channel
/// difference (sigma `sigma_color` on the 0-255 scale). Borders are
/// reflected without repeating the edge sample.
pub fn bilateral_filter(
    image: &RgbImage,
    diameter: u32,
    sigma_color: f32,
    sigma_space: f32,
) -> RgbImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 || diameter <= 1 {
        return image.clone();
    }

    let sigma_color = if sigma_color > 0.0 { sigma_color } else { 1.0 };
    let sigma_space = if sigma_space > 0.0 { sigma_space } else { 1.0 };
    let radius = (diameter / 2) as i32;

    let space_coeff = -0.5 / (sigma_space * sigma_space);
    let mut neighbourhood = Vec::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let r2 = (dx * dx + dy * dy) as f32;
            if r2.sqrt() > radius as f32 {
                continue;
            }
            neighbourhood.push((dx, dy, (r2 * space_coeff).exp()));
        }
    }

    // Range weight indexed by summed absolute difference, 0..=765
    let color_coeff = -0.5 / (sigma_color * sigma_color);
    let range_weights: Vec<f32> = (0..=3 * 255)
        .map(|d| ((d * d) as f32 * color_coeff).exp())
        .collect();

    RgbImage::from_fn(width, height, |x, y| {
        let centre = image.get_pixel(x, y).0;
        let mut acc = [0.0f32; 3];
        let mut total = 0.0f32;

        for &(dx, dy, space_weight) in &neighbourhood {
            let sx = reflect_101(x as i32 + dx, width as i32);
            let sy = reflect_101(y as i32 + dy, height as i32);
            let sample = image.get_pixel(sx, sy).0;

            let diff: usize = (0..3)
                .map(|c| (sample[c] as i32 - centre[c] as i32).unsigned_abs() as usize)
                .sum();
            let weight = space_weight * range_weights[diff];

            for c in 0..3 {
                acc[c] += sample[c] as f32 * weight;
            }
            total += weight;
        }

        if total <= 0.0 {
            return Rgb(centre);
        }
        Rgb(acc.map(|v| (v / total).round().clamp(0.0, 255.0) as u8))
    })
}

/// Soften a skin mask into an alpha ramp of width about `radius`
///
/// The mask is blurred with a `(2 * radius + 1)` Gaussian kernel; radius 0
/// returns the mask unchanged. Radii beyond the longer image side are
/// clamped to it.
pub fn feather_mask(mask: &SkinMask, radius: u32) -> SkinMask {
    if radius == 0 {
        return mask.clone();
    }
    let (width, height) = mask.dimensions();
    let radius = radius.min(width.max(height));
    SkinMask::from_levels(gaussian_blur(
        mask.as_gray(),
        radius.saturating_mul(2).saturating_add(1),
    ))
}

/// Blend `adjusted` over `original` using the mask weights as alpha
///
/// Each channel is `original + (adjusted - original) * alpha` with alpha the
/// mask weight scaled by `strength`, truncated to 8 bits. Where alpha is 0
/// the original pixel is kept exactly.
///
/// # Errors
///
/// Returns `InvalidParameter` if the three inputs are not congruent.
pub fn blend_with_mask(
    original: &RgbImage,
    adjusted: &RgbImage,
    mask: &SkinMask,
    strength: f32,
) -> Result<RgbImage> {
    if original.dimensions() != adjusted.dimensions() {
        return Err(AnalysisError::invalid_parameter(
            "adjusted dimensions",
            format!("{:?} != original {:?}", adjusted.dimensions(), original.dimensions()),
        ));
    }
    mask.ensure_matches(original)?;
    let strength = strength.clamp(0.0, 1.0);

    let (width, height) = original.dimensions();
    Ok(RgbImage::from_fn(width, height, |x, y| {
        let src = original.get_pixel(x, y).0;
        let alpha = mask.weight(x, y) * strength;
        if alpha <= 0.0 {
            return Rgb(src);
        }
        let dst = adjusted.get_pixel(x, y).0;
        Rgb([0, 1, 2].map(|c| {
            let a = src[c] as f32;
            let b = dst[c] as f32;
            (a + (b - a) * alpha).clamp(0.0, 255.0) as u8
        }))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn test_bilateral_keeps_uniform_image() {
        let image = RgbImage::from_pixel(12, 12, Rgb([180, 140, 120]));
        let smoothed = bilateral_filter(&image, 15, 80.0, 80.0);
        assert!(smoothed.pixels().all(|p| p.0 == [180, 140, 120]));
    }

    #[test]
    fn test_bilateral_keeps_hard_edges() {
        let image = RgbImage::from_fn(30, 10, |x, _| {
            if x < 15 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });
        let smoothed = bilateral_filter(&image, 9, 25.0, 25.0);
        assert!(smoothed.get_pixel(3, 5)[0] < 10);
        assert!(smoothed.get_pixel(27, 5)[0] > 245);
    }

    #[test]
    fn test_bilateral_softens_small_noise() {
        let mut image = RgbImage::from_pixel(11, 11, Rgb([150, 150, 150]));
        image.put_pixel(5, 5, Rgb([170, 150, 150]));
        let smoothed = bilateral_filter(&image, 5, 80.0, 80.0);
        let centre = smoothed.get_pixel(5, 5)[0];
        assert!(centre < 170 && centre >= 150, "centre {}", centre);
    }

    #[test]
    fn test_feather_widens_transition() {
        let mut levels = GrayImage::new(31, 1);
        for x in 15..31 {
            levels.put_pixel(x, 0, Luma([255]));
        }
        let mask = SkinMask::from_levels(levels);
        let feathered = feather_mask(&mask, 5);
        assert!(feathered.level(12, 0) > 0);
        assert!(feathered.level(17, 0) < 255);
        assert_eq!(feather_mask(&mask, 0), mask);
    }

    #[test]
    fn test_feather_huge_radius_clamped_to_extent() {
        let mut levels = GrayImage::new(12, 8);
        for x in 6..12 {
            for y in 0..8 {
                levels.put_pixel(x, y, Luma([255]));
            }
        }
        let mask = SkinMask::from_levels(levels);

        let huge = feather_mask(&mask, u32::MAX);
        assert_eq!(huge, feather_mask(&mask, 12));
        assert_eq!(huge.dimensions(), (12, 8));
        assert!(huge.level(0, 0) > 0);
        assert!(huge.level(11, 0) < 255);
    }

    #[test]
    fn test_blend_respects_alpha() {
        let original = RgbImage::from_pixel(2, 1, Rgb([100, 100, 100]));
        let adjusted = RgbImage::from_pixel(2, 1, Rgb([200, 0, 100]));
        let mask = SkinMask::from_weights(2, 1, &[0.0, 1.0]).unwrap();

        let blended = blend_with_mask(&original, &adjusted, &mask, 1.0).unwrap();
        assert_eq!(blended.get_pixel(0, 0).0, [100, 100, 100]);
        assert_eq!(blended.get_pixel(1, 0).0, [200, 0, 100]);

        let half = blend_with_mask(&original, &adjusted, &mask, 0.5).unwrap();
        assert_eq!(half.get_pixel(1, 0).0, [150, 50, 100]);
    }

    #[test]
    fn test_blend_rejects_mismatched_inputs() {
        let original = RgbImage::new(2, 2);
        let adjusted = RgbImage::new(3, 2);
        let mask = SkinMask::empty(2, 2);
        assert!(blend_with_mask(&original, &adjusted, &mask, 1.0).is_err());
    }
}
