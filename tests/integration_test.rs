//! Integration tests for detection, analysis and tone modification
//!
//! These tests validate the end-to-end workflow on synthetic images built
//! in code:
//! - Skin segmentation and its empty-mask behaviour
//! - Lightness, undertone and confidence classification
//! - Deterministic dominant color extraction
//! - Mask-guided adjustments, composite tones and their no-op law
//! - Error handling for edge cases

use image::{Rgb, RgbImage};
use skin_tone_scan::color::analysis::confidence_for_ratio;
use skin_tone_scan::color::dominant::DominantColorExtractor;
use skin_tone_scan::{
    analyze_image_file, analyze_skin_tone, detect_skin, Adjustment, AdjustmentKind,
    AnalysisError, AnalyzerConfig, SkinCategory, SkinDetector, SkinMask, SkinToneAnalysis,
    SkinToneAnalyzer, ToneModifier, Undertone,
};
use std::path::Path;

const SKIN: [u8; 3] = [224, 172, 150];
const SKIN_SHADOW: [u8; 3] = [214, 165, 144];
const SKIN_DEEP: [u8; 3] = [170, 120, 90];
const SKY: [u8; 3] = [90, 140, 220];

/// Sky background with a skin square in the middle
fn portrait(size: u32, margin: u32) -> RgbImage {
    RgbImage::from_fn(size, size, |x, y| {
        let inside = (margin..size - margin).contains(&x) && (margin..size - margin).contains(&y);
        if inside {
            Rgb(SKIN)
        } else {
            Rgb(SKY)
        }
    })
}

fn max_channel_delta(a: &RgbImage, b: &RgbImage) -> i16 {
    a.pixels()
        .zip(b.pixels())
        .flat_map(|(p, q)| (0..3).map(move |c| (p[c] as i16 - q[c] as i16).abs()))
        .max()
        .unwrap_or(0)
}

// ============================================================================
// Skin Detection
// ============================================================================

#[test]
fn test_raw_mask_full_when_every_pixel_is_skin() {
    let palette = [SKIN, SKIN_SHADOW, SKIN_DEEP];
    let image = RgbImage::from_fn(15, 9, |x, y| Rgb(palette[((x + y) % 3) as usize]));

    let raw = SkinDetector::new().raw_mask(&image).unwrap();
    assert!(raw.pixels().all(|p| p[0] == 255));
}

#[test]
fn test_no_skin_gives_empty_mask_and_analysis_error() {
    let image = RgbImage::from_pixel(32, 24, Rgb(SKY));

    let mask = detect_skin(&image).unwrap();
    assert!(mask.is_empty());
    assert_eq!(mask.dimensions(), image.dimensions());

    match analyze_skin_tone(&image) {
        Err(AnalysisError::NoSkinDetected) => {}
        other => panic!("Expected NoSkinDetected, got: {:?}", other),
    }
}

#[test]
fn test_mask_is_congruent_with_image() {
    let image = portrait(40, 10);
    let mask = detect_skin(&image).unwrap();
    assert_eq!(mask.dimensions(), (40, 40));
    assert_eq!(mask.level(20, 20), 255);
    assert_eq!(mask.level(0, 0), 0);
}

// ============================================================================
// Analysis
// ============================================================================

#[test]
fn test_portrait_analysis() {
    let image = portrait(40, 10);
    let analysis = analyze_skin_tone(&image).unwrap();

    assert_eq!(analysis.undertone, Undertone::Warm);
    assert_eq!(analysis.dominant_colors[0].rgb, SKIN);
    assert!(analysis.dominant_colors.len() <= 5);
    assert!((0.0..=100.0).contains(&analysis.lightness));
    assert!((0.0..=1.0).contains(&analysis.confidence));
    assert!(analysis.skin_pixel_count >= 400);
    assert_eq!(analysis.category, SkinCategory::from_lightness(analysis.lightness));
}

#[test]
fn test_lightness_boundary_is_half_open() {
    assert_eq!(SkinCategory::from_lightness(25.0), SkinCategory::Light);
    assert_eq!(SkinCategory::from_lightness(24.9), SkinCategory::VeryLight);
}

#[test]
fn test_undertone_dead_zone() {
    assert_eq!(Undertone::from_red_blue_difference(0.03), Undertone::Neutral);
    assert_eq!(Undertone::from_red_blue_difference(0.06), Undertone::Warm);
    assert_eq!(Undertone::from_red_blue_difference(-0.06), Undertone::Cool);
}

#[test]
fn test_exactly_five_percent_skin_scores_moderate() {
    assert_eq!(confidence_for_ratio(0.05), 0.6);

    // 40x10 = 400 pixels, 20 of them skin
    let mut image = RgbImage::from_pixel(40, 10, Rgb(SKY));
    let mut weights = vec![0.0f32; 400];
    for x in 0..20u32 {
        image.put_pixel(x, 0, Rgb(SKIN));
        weights[x as usize] = 1.0;
    }
    let mask = SkinMask::from_weights(40, 10, &weights).unwrap();

    let analysis = SkinToneAnalyzer::new()
        .analyze_with_mask(&image, &mask)
        .unwrap();
    assert_eq!(analysis.confidence, 0.6);
}

#[test]
fn test_dominant_colors_nine_to_one() {
    let mut pixels = vec![[200u8, 150, 120]; 90];
    pixels.extend(vec![[100u8, 60, 40]; 10]);

    let colors = DominantColorExtractor::new().extract(&pixels, 2).unwrap();
    assert_eq!(colors.len(), 2);
    assert_eq!(colors[0].rgb, [200, 150, 120]);
    assert_eq!(colors[0].count, 90);
    assert_eq!(colors[1].rgb, [100, 60, 40]);
}

#[test]
fn test_dominant_colors_empty_set_fails() {
    assert!(matches!(
        DominantColorExtractor::new().extract(&[], 5),
        Err(AnalysisError::ClusteringError { .. })
    ));
}

#[test]
fn test_analysis_is_deterministic() {
    let image = RgbImage::from_fn(30, 30, |x, y| {
        let palette = [SKIN, SKIN_SHADOW, SKIN_DEEP, [205, 150, 125], [190, 140, 110], [230, 180, 160]];
        Rgb(palette[((x * 7 + y * 3) % 6) as usize])
    });
    let first = analyze_skin_tone(&image).unwrap();
    let second = analyze_skin_tone(&image).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.dominant_colors.len(), 5);
    for pair in first.dominant_colors.windows(2) {
        assert!(pair[0].count >= pair[1].count);
    }
}

#[test]
fn test_analysis_json_roundtrip() {
    let analysis = analyze_skin_tone(&portrait(30, 8)).unwrap();
    let json = analysis.to_json().unwrap();
    let back: SkinToneAnalysis = serde_json::from_str(&json).unwrap();
    assert_eq!(back, analysis);
    assert!(json.contains("\"undertone\": \"Warm\""));
}

#[test]
fn test_analyze_missing_file() {
    let result = analyze_image_file(Path::new("nonexistent_file.jpg"));
    match result {
        Err(AnalysisError::ImageLoadError { .. }) => {}
        other => panic!("Expected ImageLoadError, got: {:?}", other),
    }
}

// ============================================================================
// Tone Modification
// ============================================================================

#[test]
fn test_zero_lightness_is_identity_within_rounding() {
    let image = portrait(30, 8);
    let result = ToneModifier::new().adjust_lightness(&image, 0.0).unwrap();
    assert!(max_channel_delta(&image, &result) <= 1);
}

#[test]
fn test_lightness_direction() {
    let image = portrait(30, 8);
    let modifier = ToneModifier::new();
    let lighter = modifier.adjust_lightness(&image, 20.0).unwrap();
    let darker = modifier.adjust_lightness(&image, -20.0).unwrap();

    let sum = |p: &Rgb<u8>| p.0.iter().map(|&c| c as u32).sum::<u32>();
    let base = sum(image.get_pixel(15, 15));
    assert!(sum(lighter.get_pixel(15, 15)) > base);
    assert!(sum(darker.get_pixel(15, 15)) < base);
    assert_eq!(lighter.get_pixel(0, 0).0, SKY);
}

#[test]
fn test_no_skin_adjustments_are_noops() {
    let image = RgbImage::from_pixel(20, 20, Rgb(SKY));
    let modifier = ToneModifier::new();

    for kind in [
        AdjustmentKind::Lightness,
        AdjustmentKind::Warmth,
        AdjustmentKind::Saturation,
    ] {
        for value in [-50.0, -12.5, 0.0, 33.0, 50.0] {
            let adjustment = Adjustment::new(kind, value).unwrap();
            assert_eq!(modifier.apply(&image, adjustment).unwrap(), image);
        }
    }
}

#[test]
fn test_warmer_applies_warmth_then_saturation() {
    let image = portrait(30, 8);
    let modifier = ToneModifier::new();

    let composite = modifier.change_skin_tone(&image, "warmer").unwrap();
    let step = modifier.adjust_warmth(&image, 20.0).unwrap();
    let expected = modifier.adjust_saturation(&step, 10.0).unwrap();
    assert_eq!(composite, expected);

    let centre = composite.get_pixel(15, 15).0;
    assert!(centre[0] > SKIN[0]);
}

#[test]
fn test_unknown_tone_fails() {
    let image = portrait(20, 5);
    let before = image.clone();
    match ToneModifier::new().change_skin_tone(&image, "pinkish") {
        Err(AnalysisError::UnknownTone { name }) => assert_eq!(name, "pinkish"),
        other => panic!("Expected UnknownTone, got: {:?}", other),
    }
    assert_eq!(image, before);
}

#[test]
fn test_out_of_range_adjustment_rejected() {
    let image = portrait(20, 5);
    assert!(matches!(
        ToneModifier::new().adjust_saturation(&image, 75.0),
        Err(AnalysisError::InvalidParameter { .. })
    ));
}

#[test]
fn test_feathered_adjustment_blends_edges() {
    let image = portrait(40, 10);
    let modifier = ToneModifier::new();
    let adjustment = Adjustment::warmth(40.0).unwrap();

    let hard = modifier.apply(&image, adjustment).unwrap();
    let soft = modifier
        .apply_gradual_adjustment(&image, adjustment, Some(3))
        .unwrap();

    assert_eq!(soft.get_pixel(0, 0).0, SKY);
    assert_eq!(soft.get_pixel(20, 20).0, hard.get_pixel(20, 20).0);

    // Near the boundary the blend is between original and adjusted
    let x = 10;
    let original = image.get_pixel(x, 20)[0];
    let full = hard.get_pixel(x, 20)[0];
    let blended = soft.get_pixel(x, 20)[0];
    assert!(blended >= original && blended <= full);
}

#[test]
fn test_feather_radius_beyond_image_is_clamped() {
    let image = portrait(20, 5);
    let modifier = ToneModifier::new();
    let adjustment = Adjustment::warmth(10.0).unwrap();

    let huge = modifier
        .apply_gradual_adjustment(&image, adjustment, Some(1 << 31))
        .unwrap();
    let widest = modifier
        .apply_gradual_adjustment(&image, adjustment, Some(20))
        .unwrap();
    assert_eq!(huge, widest);
}

#[test]
fn test_texture_smoothing_reduces_variation() {
    let size = 30;
    let image = RgbImage::from_fn(size, size, |x, y| {
        if (x + y) % 2 == 0 {
            Rgb(SKIN)
        } else {
            Rgb(SKIN_SHADOW)
        }
    });

    let smoothed = ToneModifier::new().enhance_skin_texture(&image, 1.0).unwrap();
    let a = smoothed.get_pixel(15, 15)[0] as i16;
    let b = smoothed.get_pixel(16, 15)[0] as i16;
    assert!((a - b).abs() < (SKIN[0] as i16 - SKIN_SHADOW[0] as i16));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_file_roundtrip() {
    let dir = std::env::temp_dir().join("skin_tone_scan_integration");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.json");

    let mut config = AnalyzerConfig::default();
    config.clustering.dominant_colors = 3;
    config.to_json_file(&path).unwrap();

    let loaded = AnalyzerConfig::from_json_file(&path).unwrap();
    assert_eq!(loaded, config);

    let analysis = SkinToneAnalyzer::with_config(&loaded)
        .analyze(&RgbImage::from_fn(20, 20, |x, _| {
            Rgb([SKIN, SKIN_SHADOW, SKIN_DEEP, [205, 150, 125]][(x % 4) as usize])
        }))
        .unwrap();
    assert_eq!(analysis.dominant_colors.len(), 3);

    std::fs::remove_file(&path).ok();
}
