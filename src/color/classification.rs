//! Skin tone labels derived from lightness and red/blue balance

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{lightness as bounds, undertone as balance};

/// Lightness bucket of a skin tone
///
/// Buckets are half-open `[min, max)` ranges on L*, so a value sitting on a
/// boundary belongs to the upper bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkinCategory {
    #[serde(rename = "Very Light")]
    VeryLight,
    #[serde(rename = "Light")]
    Light,
    #[serde(rename = "Light Medium")]
    LightMedium,
    #[serde(rename = "Medium")]
    Medium,
    #[serde(rename = "Medium Dark")]
    MediumDark,
    #[serde(rename = "Dark")]
    Dark,
}

impl SkinCategory {
    /// All buckets in ascending lightness order
    pub const ALL: [SkinCategory; 6] = [
        SkinCategory::VeryLight,
        SkinCategory::Light,
        SkinCategory::LightMedium,
        SkinCategory::Medium,
        SkinCategory::MediumDark,
        SkinCategory::Dark,
    ];

    /// Half-open L* range covered by this bucket
    pub fn range(self) -> (f32, f32) {
        match self {
            SkinCategory::VeryLight => (bounds::VERY_LIGHT_MIN, bounds::LIGHT_MIN),
            SkinCategory::Light => (bounds::LIGHT_MIN, bounds::LIGHT_MEDIUM_MIN),
            SkinCategory::LightMedium => (bounds::LIGHT_MEDIUM_MIN, bounds::MEDIUM_MIN),
            SkinCategory::Medium => (bounds::MEDIUM_MIN, bounds::MEDIUM_DARK_MIN),
            SkinCategory::MediumDark => (bounds::MEDIUM_DARK_MIN, bounds::DARK_MIN),
            SkinCategory::Dark => (bounds::DARK_MIN, bounds::MAX),
        }
    }

    /// Classify an L* value; out-of-range values clamp to the end buckets
    pub fn from_lightness(lightness: f32) -> Self {
        if lightness.is_nan() || lightness < bounds::VERY_LIGHT_MIN {
            return SkinCategory::VeryLight;
        }
        Self::ALL
            .iter()
            .copied()
            .find(|category| {
                let (min, max) = category.range();
                lightness >= min && lightness < max
            })
            .unwrap_or(SkinCategory::Dark)
    }

    pub fn name(self) -> &'static str {
        match self {
            SkinCategory::VeryLight => "Very Light",
            SkinCategory::Light => "Light",
            SkinCategory::LightMedium => "Light Medium",
            SkinCategory::Medium => "Medium",
            SkinCategory::MediumDark => "Medium Dark",
            SkinCategory::Dark => "Dark",
        }
    }
}

impl fmt::Display for SkinCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Underlying color cast of the skin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Undertone {
    Cool,
    Warm,
    Neutral,
}

impl Undertone {
    /// Classify from the normalized red minus blue difference
    ///
    /// Differences within the +/-0.05 band are Neutral.
    pub fn from_red_blue_difference(difference: f32) -> Self {
        if difference > balance::NEUTRAL_BAND {
            Undertone::Warm
        } else if difference < -balance::NEUTRAL_BAND {
            Undertone::Cool
        } else {
            Undertone::Neutral
        }
    }

    /// Classify a mean color on the 0-255 scale
    pub fn from_mean_color(rgb: [f32; 3]) -> Self {
        Self::from_red_blue_difference(red_blue_difference(rgb))
    }

    pub fn name(self) -> &'static str {
        match self {
            Undertone::Cool => "Cool",
            Undertone::Warm => "Warm",
            Undertone::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for Undertone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Coarse color temperature label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Temperature {
    Warm,
    #[serde(rename = "Neutral-Warm")]
    NeutralWarm,
    Neutral,
    #[serde(rename = "Neutral-Cool")]
    NeutralCool,
    Cool,
}

impl Temperature {
    /// Classify a mean color on the 0-255 scale
    ///
    /// Any red/blue imbalance leans the label; only imbalances above 0.1
    /// (normalized) reach the full Warm or Cool label.
    pub fn from_mean_color(rgb: [f32; 3]) -> Self {
        let r = rgb[0] / 255.0;
        let b = rgb[2] / 255.0;

        if r > b {
            if r - b > balance::TEMPERATURE_THRESHOLD {
                Temperature::Warm
            } else {
                Temperature::NeutralWarm
            }
        } else if b > r {
            if b - r > balance::TEMPERATURE_THRESHOLD {
                Temperature::Cool
            } else {
                Temperature::NeutralCool
            }
        } else {
            Temperature::Neutral
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Temperature::Warm => "Warm",
            Temperature::NeutralWarm => "Neutral-Warm",
            Temperature::Neutral => "Neutral",
            Temperature::NeutralCool => "Neutral-Cool",
            Temperature::Cool => "Cool",
        }
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Seasonal color palette family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
    #[serde(rename = "Light Summer")]
    LightSummer,
    #[serde(rename = "Deep Autumn")]
    DeepAutumn,
}

impl Season {
    /// Pick the seasonal palette from undertone and L*
    pub fn from_undertone(undertone: Undertone, lightness: f32) -> Self {
        let light = lightness > bounds::SEASON_SPLIT;
        match (undertone, light) {
            (Undertone::Cool, true) => Season::Summer,
            (Undertone::Cool, false) => Season::Winter,
            (Undertone::Warm, true) => Season::Spring,
            (Undertone::Warm, false) => Season::Autumn,
            (Undertone::Neutral, true) => Season::LightSummer,
            (Undertone::Neutral, false) => Season::DeepAutumn,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
            Season::Winter => "Winter",
            Season::LightSummer => "Light Summer",
            Season::DeepAutumn => "Deep Autumn",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Normalized red minus normalized blue of a 0-255 color
pub fn red_blue_difference(rgb: [f32; 3]) -> f32 {
    rgb[0] / 255.0 - rgb[2] / 255.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_boundaries_are_half_open() {
        assert_eq!(SkinCategory::from_lightness(0.0), SkinCategory::VeryLight);
        assert_eq!(SkinCategory::from_lightness(24.999), SkinCategory::VeryLight);
        assert_eq!(SkinCategory::from_lightness(25.0), SkinCategory::Light);
        assert_eq!(SkinCategory::from_lightness(40.0), SkinCategory::LightMedium);
        assert_eq!(SkinCategory::from_lightness(55.0), SkinCategory::Medium);
        assert_eq!(SkinCategory::from_lightness(70.0), SkinCategory::MediumDark);
        assert_eq!(SkinCategory::from_lightness(85.0), SkinCategory::Dark);
        assert_eq!(SkinCategory::from_lightness(99.99), SkinCategory::Dark);
    }

    #[test]
    fn test_category_out_of_range_clamps() {
        assert_eq!(SkinCategory::from_lightness(-3.0), SkinCategory::VeryLight);
        assert_eq!(SkinCategory::from_lightness(100.0), SkinCategory::Dark);
        assert_eq!(SkinCategory::from_lightness(140.0), SkinCategory::Dark);
    }

    #[test]
    fn test_exactly_one_bucket_matches() {
        let mut l = 0.0f32;
        while l < 100.0 {
            let matches = SkinCategory::ALL
                .iter()
                .filter(|c| {
                    let (min, max) = c.range();
                    l >= min && l < max
                })
                .count();
            assert_eq!(matches, 1, "L* = {}", l);
            l += 0.25;
        }
    }

    #[test]
    fn test_undertone_dead_zone() {
        assert_eq!(Undertone::from_red_blue_difference(0.03), Undertone::Neutral);
        assert_eq!(Undertone::from_red_blue_difference(-0.03), Undertone::Neutral);
        assert_eq!(Undertone::from_red_blue_difference(0.06), Undertone::Warm);
        assert_eq!(Undertone::from_red_blue_difference(-0.06), Undertone::Cool);
    }

    #[test]
    fn test_undertone_from_mean_color() {
        assert_eq!(Undertone::from_mean_color([200.0, 150.0, 120.0]), Undertone::Warm);
        assert_eq!(Undertone::from_mean_color([120.0, 150.0, 200.0]), Undertone::Cool);
        assert_eq!(Undertone::from_mean_color([150.0, 150.0, 145.0]), Undertone::Neutral);
    }

    #[test]
    fn test_temperature_granularity() {
        assert_eq!(Temperature::from_mean_color([200.0, 0.0, 100.0]), Temperature::Warm);
        assert_eq!(Temperature::from_mean_color([110.0, 0.0, 100.0]), Temperature::NeutralWarm);
        assert_eq!(Temperature::from_mean_color([100.0, 0.0, 100.0]), Temperature::Neutral);
        assert_eq!(Temperature::from_mean_color([100.0, 0.0, 110.0]), Temperature::NeutralCool);
        assert_eq!(Temperature::from_mean_color([100.0, 0.0, 200.0]), Temperature::Cool);
    }

    #[test]
    fn test_undertone_and_temperature_can_differ() {
        // 0.07 normalized: Warm undertone but only Neutral-Warm temperature
        let rgb = [117.85, 100.0, 100.0];
        assert_eq!(Undertone::from_mean_color(rgb), Undertone::Warm);
        assert_eq!(Temperature::from_mean_color(rgb), Temperature::NeutralWarm);
    }

    #[test]
    fn test_seasons() {
        assert_eq!(Season::from_undertone(Undertone::Cool, 70.0), Season::Summer);
        assert_eq!(Season::from_undertone(Undertone::Cool, 60.0), Season::Winter);
        assert_eq!(Season::from_undertone(Undertone::Warm, 61.0), Season::Spring);
        assert_eq!(Season::from_undertone(Undertone::Warm, 30.0), Season::Autumn);
        assert_eq!(Season::from_undertone(Undertone::Neutral, 80.0), Season::LightSummer);
        assert_eq!(Season::from_undertone(Undertone::Neutral, 20.0), Season::DeepAutumn);
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(serde_json::to_string(&SkinCategory::LightMedium).unwrap(), "\"Light Medium\"");
        assert_eq!(serde_json::to_string(&Temperature::NeutralCool).unwrap(), "\"Neutral-Cool\"");
        assert_eq!(SkinCategory::MediumDark.to_string(), "Medium Dark");
    }
}
