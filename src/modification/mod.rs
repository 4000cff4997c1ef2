//! Skin tone modification module
//!
//! This module applies lightness, warmth and saturation edits restricted
//! to detected skin, with optional feathering and texture smoothing.

pub mod filters;
pub mod modifier;

pub use modifier::{Adjustment, AdjustmentKind, TonePreset, ToneModifier, ToneTarget};
