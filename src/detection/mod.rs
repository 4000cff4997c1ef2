//! Skin region detection module
//!
//! This module handles segmentation of skin-colored regions and the
//! morphological cleanup of the resulting masks.

pub mod mask;
pub mod morphology;
pub mod skin;

pub use mask::SkinMask;
pub use skin::SkinDetector;
