//! Skin mask: a per-pixel membership weight congruent with its image

use image::{GrayImage, Luma, RgbImage};

use crate::{AnalysisError, Result};

/// Per-pixel skin membership stored as 8-bit levels
///
/// Level 0 means "not skin", 255 means "fully skin" and intermediate levels
/// are soft membership produced by edge smoothing or feathering. The
/// normalized weight of a cell is `level / 255`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkinMask {
    levels: GrayImage,
}

impl SkinMask {
    /// Wrap an existing level image
    pub fn from_levels(levels: GrayImage) -> Self {
        Self { levels }
    }

    /// Mask with no skin at all
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            levels: GrayImage::new(width, height),
        }
    }

    /// Mask built from normalized weights in row-major order
    ///
    /// Weights are clamped to [0,1]. Returns `None` when the slice length
    /// does not match the dimensions.
    pub fn from_weights(width: u32, height: u32, weights: &[f32]) -> Option<Self> {
        if weights.len() != (width as usize) * (height as usize) {
            return None;
        }
        let levels = GrayImage::from_fn(width, height, |x, y| {
            let w = weights[(y * width + x) as usize];
            Luma([(w.clamp(0.0, 1.0) * 255.0).round() as u8])
        });
        Some(Self { levels })
    }

    pub fn width(&self) -> u32 {
        self.levels.width()
    }

    pub fn height(&self) -> u32 {
        self.levels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.levels.dimensions()
    }

    /// Raw 8-bit level at a pixel
    pub fn level(&self, x: u32, y: u32) -> u8 {
        self.levels.get_pixel(x, y)[0]
    }

    /// Normalized weight in [0,1] at a pixel
    pub fn weight(&self, x: u32, y: u32) -> f32 {
        self.level(x, y) as f32 / 255.0
    }

    /// Whether the pixel has any skin membership
    pub fn is_skin(&self, x: u32, y: u32) -> bool {
        self.level(x, y) > 0
    }

    /// True when no cell has any skin membership
    pub fn is_empty(&self) -> bool {
        self.levels.pixels().all(|p| p[0] == 0)
    }

    /// Number of cells with weight > 0
    pub fn skin_pixel_count(&self) -> usize {
        self.levels.pixels().filter(|p| p[0] > 0).count()
    }

    /// Fraction of cells with weight > 0
    pub fn coverage(&self) -> f32 {
        let total = self.levels.width() as usize * self.levels.height() as usize;
        if total == 0 {
            return 0.0;
        }
        self.skin_pixel_count() as f32 / total as f32
    }

    /// Sum of all normalized weights
    pub fn total_weight(&self) -> f32 {
        self.levels.pixels().map(|p| p[0] as f32 / 255.0).sum()
    }

    /// Underlying level image
    pub fn as_gray(&self) -> &GrayImage {
        &self.levels
    }

    pub fn into_gray(self) -> GrayImage {
        self.levels
    }

    /// Fail unless the mask is congruent with `image`
    pub fn ensure_matches(&self, image: &RgbImage) -> Result<()> {
        if self.dimensions() != image.dimensions() {
            return Err(AnalysisError::invalid_parameter(
                "mask dimensions",
                format!("{:?} != image {:?}", self.dimensions(), image.dimensions()),
            ));
        }
        Ok(())
    }

    /// Collect the RGB triples of every pixel with weight > 0
    ///
    /// Pixels are not deduplicated; order is row-major but carries no meaning.
    pub fn skin_pixels(&self, image: &RgbImage) -> Result<Vec<[u8; 3]>> {
        self.ensure_matches(image)?;
        Ok(image
            .enumerate_pixels()
            .filter(|(x, y, _)| self.is_skin(*x, *y))
            .map(|(_, _, p)| p.0)
            .collect())
    }
}
