use crate::enums::Asymmetry;

/// Relative left/right difference beyond which a structure is asymmetric
pub const ASYMMETRY_THRESHOLD: f64 = 0.15;

/// Asymmetry index and its classification for one structure
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AsymmetryResult {
    pub index: f64,
    pub label: Asymmetry,
}

/// `(right - left) / |left|`, or 0 when `left` is 0
pub fn asymmetry_index(left: f64, right: f64) -> f64 {
    if left == 0.0 {
        return 0.0;
    }
    let index = (right - left) / left.abs();
    if index.is_finite() { index } else { 0.0 }
}

impl Asymmetry {
    /// Boundaries at exactly ±0.15 are symmetric
    pub fn from_index(index: f64) -> Self {
        if index < -ASYMMETRY_THRESHOLD {
            Asymmetry::LeftDominant
        } else if index > ASYMMETRY_THRESHOLD {
            Asymmetry::RightDominant
        } else {
            Asymmetry::Symmetric
        }
    }
}

pub fn classify(left: f64, right: f64) -> AsymmetryResult {
    let index = asymmetry_index(left, right);
    AsymmetryResult {
        index,
        label: Asymmetry::from_index(index),
    }
}
