//! Morphological cleanup and Gaussian smoothing for single-channel masks
//!
//! Erosion and dilation use an elliptical structuring element and ignore
//! samples that fall outside the image, so regions touching the border are
//! not eaten away. Gaussian smoothing uses explicit odd kernel sizes with
//! reflect-101 borders.

use image::{GrayImage, Luma};

/// Binary structuring element stored as offsets from its anchor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuringElement {
    offsets: Vec<(i32, i32)>,
    radius: u32,
}

impl StructuringElement {
    /// Elliptical element inscribed in a `(2r+1) x (2r+1)` box
    ///
    /// Radius 2 yields the familiar 5x5 ellipse whose first and last rows
    /// hold only the centre cell.
    pub fn ellipse(radius: u32) -> Self {
        let r = radius as i32;
        let mut offsets = Vec::new();

        if r == 0 {
            offsets.push((0, 0));
        } else {
            let inv_r2 = 1.0 / (r * r) as f64;
            for dy in -r..=r {
                let dx = (r as f64 * (((r * r - dy * dy) as f64) * inv_r2).sqrt()).round() as i32;
                for x in -dx..=dx {
                    offsets.push((x, dy));
                }
            }
        }

        Self { offsets, radius }
    }

    /// Offsets `(dx, dy)` covered by the element
    pub fn offsets(&self) -> &[(i32, i32)] {
        &self.offsets
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }
}

/// Minimum filter over the structuring element
pub fn erode(mask: &GrayImage, element: &StructuringElement) -> GrayImage {
    rank_filter(mask, element, u8::MAX, u8::min)
}

/// Maximum filter over the structuring element
pub fn dilate(mask: &GrayImage, element: &StructuringElement) -> GrayImage {
    rank_filter(mask, element, u8::MIN, u8::max)
}

/// Erosion followed by dilation: removes speckles smaller than the element
pub fn open(mask: &GrayImage, element: &StructuringElement) -> GrayImage {
    dilate(&erode(mask, element), element)
}

/// Dilation followed by erosion: fills holes smaller than the element
pub fn close(mask: &GrayImage, element: &StructuringElement) -> GrayImage {
    erode(&dilate(mask, element), element)
}

fn rank_filter(
    mask: &GrayImage,
    element: &StructuringElement,
    init: u8,
    pick: fn(u8, u8) -> u8,
) -> GrayImage {
    let (width, height) = mask.dimensions();
    let (w, h) = (width as i32, height as i32);

    GrayImage::from_fn(width, height, |x, y| {
        let mut acc = init;
        for &(dx, dy) in element.offsets() {
            let nx = x as i32 + dx;
            let ny = y as i32 + dy;
            if nx < 0 || ny < 0 || nx >= w || ny >= h {
                continue;
            }
            acc = pick(acc, mask.get_pixel(nx as u32, ny as u32)[0]);
        }
        Luma([acc])
    })
}

/// Sigma implied by a kernel size when none is given
pub fn sigma_for_kernel(kernel_size: u32) -> f64 {
    0.3 * ((kernel_size as f64 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalized 1-D Gaussian kernel of odd size
///
/// Small kernels use the fixed binomial-like tables, larger ones are
/// sampled from the Gaussian with [`sigma_for_kernel`].
pub fn gaussian_kernel(kernel_size: u32) -> Vec<f64> {
    match kernel_size {
        0 | 1 => vec![1.0],
        3 => vec![0.25, 0.5, 0.25],
        5 => vec![0.0625, 0.25, 0.375, 0.25, 0.0625],
        7 => vec![0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125],
        size => {
            let sigma = sigma_for_kernel(size);
            let half = (size / 2) as i32;
            let scale = -0.5 / (sigma * sigma);
            let raw: Vec<f64> = (-half..=half)
                .map(|i| ((i * i) as f64 * scale).exp())
                .collect();
            let sum: f64 = raw.iter().sum();
            raw.into_iter().map(|v| v / sum).collect()
        }
    }
}

/// Separable Gaussian blur of a single-channel image
///
/// Even kernel sizes are bumped to the next odd size. Kernels wider than
/// `2 * max(width, height) + 1` are clamped to that size.
pub fn gaussian_blur(mask: &GrayImage, kernel_size: u32) -> GrayImage {
    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 {
        return mask.clone();
    }

    let limit = width.max(height).saturating_mul(2).saturating_add(1);
    let size = kernel_size.min(limit);
    let size = if size % 2 == 0 { size + 1 } else { size };
    let kernel = gaussian_kernel(size);
    if kernel.len() == 1 {
        return mask.clone();
    }
    let half = (kernel.len() / 2) as i32;

    let mut horizontal = vec![0.0f64; (width * height) as usize];
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0;
            for (k, weight) in kernel.iter().enumerate() {
                let sx = reflect_101(x as i32 + k as i32 - half, width as i32);
                acc += weight * mask.get_pixel(sx, y)[0] as f64;
            }
            horizontal[(y * width + x) as usize] = acc;
        }
    }

    GrayImage::from_fn(width, height, |x, y| {
        let mut acc = 0.0;
        for (k, weight) in kernel.iter().enumerate() {
            let sy = reflect_101(y as i32 + k as i32 - half, height as i32);
            acc += weight * horizontal[(sy * width + x) as usize];
        }
        Luma([acc.round().clamp(0.0, 255.0) as u8])
    })
}

/// Reflect an out-of-range index without repeating the edge sample
pub(crate) fn reflect_101(index: i32, len: i32) -> u32 {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len - 1);
    let mut i = index.rem_euclid(period);
    if i >= len {
        i = period - i;
    }
    i as u32
}
