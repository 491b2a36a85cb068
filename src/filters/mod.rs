//! Landmark stabilization filter bank.
//!
//! This module provides the smoothing primitives the pose pipeline is built
//! from: the adaptive one-euro filter, the per-point stabilizer that layers
//! dead-zone and prediction logic on top of it, the 21-landmark bank, and a
//! trivial scalar EMA for derived signals.

/// One-euro style adaptive low-pass filter
pub mod one_euro;

/// Per-landmark dead-zone / jitter / prediction stabilizer
pub mod point_stabilizer;

/// 21-landmark filter bank with named presets
pub mod landmark_stabilizer;

/// Exponential moving average for derived scalars
pub mod scalar_ema;

pub use landmark_stabilizer::{LandmarkSetStabilizer, StabilizationMode};
pub use one_euro::{OneEuroFilter, OneEuroParams};
pub use point_stabilizer::{PointStabilizer, StabilizerOverrides, StabilizerParams};
pub use scalar_ema::ScalarEma;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BASE_STRENGTH, DEFAULT_RESPONSIVENESS, DEFAULT_SMOOTHING_SLIDER};

/// The single latency/smoothness trade-off law shared by every smoothing
/// stage downstream of the filter bank (position, scale, depth, rotation).
///
/// Each stage turns {a responsiveness constant, a base smoothing-strength
/// floor, the user smoothing slider, the current motion attenuation} into
/// one interpolation factor. Motion attenuation near the floor relaxes the
/// stage toward instant response; attenuation near 1 applies the full
/// configured smoothing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingLaw {
    /// Rate constant converting frame time into catch-up speed
    pub responsiveness: f64,
    /// Lower bound on smoothing strength, keeps the slider from disabling
    /// smoothing entirely
    pub base_strength: f64,
    /// User-facing smoothing slider in [0,1]
    pub slider: f64,
}

impl Default for SmoothingLaw {
    fn default() -> Self {
        Self {
            responsiveness: DEFAULT_RESPONSIVENESS,
            base_strength: DEFAULT_BASE_STRENGTH,
            slider: DEFAULT_SMOOTHING_SLIDER,
        }
    }
}

impl SmoothingLaw {
    /// Interpolation factor for one frame at the given motion attenuation
    #[must_use]
    pub fn alpha(&self, dt: f64, attenuation: f64) -> f64 {
        let strength = self.base_strength + self.slider.clamp(0.0, 1.0) * (1.0 - self.base_strength);
        let effective = (strength * attenuation.clamp(0.0, 1.0)).max(1e-3);
        (1.0 - (-dt.max(0.0) * self.responsiveness / effective).exp()).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attenuation_relaxes_smoothing() {
        let law = SmoothingLaw::default();
        let dt = 1.0 / 60.0;
        let at_rest = law.alpha(dt, 1.0);
        let in_motion = law.alpha(dt, 0.2);
        assert!(in_motion > at_rest);
        assert!(in_motion > 0.6);
        assert!(at_rest < 0.5);
    }

    #[test]
    fn test_alpha_bounds() {
        let law = SmoothingLaw::default();
        for &att in &[0.0, 0.15, 0.5, 1.0] {
            for &dt in &[0.0, 1.0 / 240.0, 1.0 / 30.0, 0.5] {
                let a = law.alpha(dt, att);
                assert!((0.0..=1.0).contains(&a));
            }
        }
    }

    #[test]
    fn test_zero_dt_holds() {
        let law = SmoothingLaw::default();
        assert_eq!(law.alpha(0.0, 1.0), 0.0);
    }
}
