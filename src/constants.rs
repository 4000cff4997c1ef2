//! Thresholds and reference values for skin analysis and tone editing
//!
//! This module contains compile-time constants grouped by the stage that
//! consumes them. Runtime-tunable copies live in [`crate::config`].

/// Skin segmentation ranges on the 8-bit color scales
pub mod skin {
    /// HSV lower bound (H in [0,180), S and V in [0,255])
    pub const HSV_LOWER: [u8; 3] = [0, 20, 70];
    /// HSV upper bound
    pub const HSV_UPPER: [u8; 3] = [20, 255, 255];

    /// YCrCb lower bound (Y, Cr, Cb)
    pub const YCRCB_LOWER: [u8; 3] = [0, 135, 85];
    /// YCrCb upper bound
    pub const YCRCB_UPPER: [u8; 3] = [255, 180, 135];

    /// Full mask level
    pub const MASK_ON: u8 = 255;
}

/// Mask cleanup parameters
pub mod morphology {
    /// Radius of the elliptical structuring element (5x5 ellipse)
    pub const ELLIPSE_RADIUS: u32 = 2;

    /// Edge blur kernel used when detecting for analysis
    pub const ANALYSIS_BLUR_KERNEL: u32 = 3;

    /// Edge blur kernel used when detecting for modification
    pub const MODIFIER_BLUR_KERNEL: u32 = 5;

    /// Largest configurable blur kernel or filter diameter
    pub const MAX_KERNEL_SIZE: u32 = 255;

    /// Largest configurable structuring element radius
    pub const MAX_ELLIPSE_RADIUS: u32 = MAX_KERNEL_SIZE / 2;
}

/// Lightness bucket lower bounds (half-open ranges on L*)
pub mod lightness {
    pub const VERY_LIGHT_MIN: f32 = 0.0;
    pub const LIGHT_MIN: f32 = 25.0;
    pub const LIGHT_MEDIUM_MIN: f32 = 40.0;
    pub const MEDIUM_MIN: f32 = 55.0;
    pub const MEDIUM_DARK_MIN: f32 = 70.0;
    pub const DARK_MIN: f32 = 85.0;

    /// Upper end of the L* scale
    pub const MAX: f32 = 100.0;

    /// Seasonal palettes split light from deep at this L*
    pub const SEASON_SPLIT: f32 = 60.0;
}

/// Red-versus-blue balance thresholds on normalized [0,1] channels
pub mod undertone {
    /// Neutral dead-zone half width for undertone
    pub const NEUTRAL_BAND: f32 = 0.05;

    /// Coarser split between "Neutral-" and full temperature labels
    pub const TEMPERATURE_THRESHOLD: f32 = 0.1;
}

/// Confidence as a function of the skin pixel ratio
pub mod confidence {
    /// Ratio below which detection is considered sparse
    pub const SPARSE_RATIO: f32 = 0.05;
    /// Ratio below which detection is considered moderate
    pub const MODERATE_RATIO: f32 = 0.15;
    /// Ratio above which detection likely includes false positives
    pub const EXCESSIVE_RATIO: f32 = 0.40;

    pub const SPARSE: f32 = 0.3;
    pub const MODERATE: f32 = 0.6;
    pub const IDEAL: f32 = 0.9;
    pub const EXCESSIVE: f32 = 0.8;
}

/// k-means dominant color extraction
pub mod clustering {
    /// Number of dominant colors reported by the analyzer
    pub const DOMINANT_COLORS: usize = 5;

    /// Seed of the first restart
    pub const SEED: u64 = 42;

    /// Independent restarts; the lowest inertia wins
    pub const RESTARTS: usize = 10;

    /// Lloyd iterations per restart
    pub const MAX_ITERATIONS: usize = 300;
}

/// Tone modification parameters
pub mod modification {
    /// Adjustment magnitudes are limited to +/- this value
    pub const MAX_MAGNITUDE: f32 = 50.0;

    /// Warmth coefficients: (red, blue) gain per unit when warming
    pub const WARM_GAIN: (f32, f32) = (0.3, 0.2);
    /// Warmth coefficients: (red, blue) gain per unit when cooling
    pub const COOL_GAIN: (f32, f32) = (0.2, 0.3);

    /// Default feather radius for gradual adjustments
    pub const FEATHER_RADIUS: u32 = 10;

    /// Bilateral filter used for texture smoothing
    pub const BILATERAL_DIAMETER: u32 = 15;
    pub const BILATERAL_SIGMA_COLOR: f32 = 80.0;
    pub const BILATERAL_SIGMA_SPACE: f32 = 80.0;

    /// Default texture smoothing intensity
    pub const SMOOTHING: f32 = 0.3;
}

/// Upload limits applied before images reach the core
pub mod loader {
    /// Maximum accepted file size (5 MiB)
    pub const MAX_FILE_BYTES: u64 = 5_242_880;

    /// Images are downscaled to fit within this box
    pub const MAX_DIMENSION: u32 = 800;

    /// Accepted file extensions
    pub const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];
}
