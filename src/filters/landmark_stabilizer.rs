//! Whole-hand stabilization: one [`PointStabilizer`] per landmark under a
//! named quality/latency preset.

use serde::{Deserialize, Serialize};

use crate::constants::NUM_HAND_LANDMARKS;
use crate::filters::point_stabilizer::{PointStabilizer, StabilizerOverrides, StabilizerParams};
use crate::landmarks::Landmark;
use crate::{Error, Result};

/// Named point on the responsiveness/smoothness continuum.
///
/// There is no single correct setting: `Responsive` tracks with near-zero
/// lag but shows more residual jitter, `Steady` smooths heavily at the cost
/// of visible lag on fast gestures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StabilizationMode {
    Responsive,
    Balanced,
    Smooth,
    Steady,
}

impl StabilizationMode {
    /// Look up a mode by name
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "responsive" => Ok(Self::Responsive),
            "balanced" => Ok(Self::Balanced),
            "smooth" => Ok(Self::Smooth),
            "steady" => Ok(Self::Steady),
            _ => Err(Error::FilterError(format!("Unknown stabilization preset: {name}"))),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Responsive => "responsive",
            Self::Balanced => "balanced",
            Self::Smooth => "smooth",
            Self::Steady => "steady",
        }
    }

    /// The parameter bundle this preset names
    #[must_use]
    pub fn params(&self) -> StabilizerParams {
        match self {
            Self::Responsive => StabilizerParams {
                dead_zone: 0.0015,
                jitter_threshold: 0.004,
                prediction_strength: 1.4,
                velocity_smoothing: 0.55,
                min_cutoff: 1.2,
                beta: 8.0,
                derivative_cutoff: 1.0,
            },
            Self::Balanced => StabilizerParams {
                dead_zone: 0.0025,
                jitter_threshold: 0.006,
                prediction_strength: 1.0,
                velocity_smoothing: 0.45,
                min_cutoff: 0.9,
                beta: 5.0,
                derivative_cutoff: 1.0,
            },
            Self::Smooth => StabilizerParams {
                dead_zone: 0.004,
                jitter_threshold: 0.009,
                prediction_strength: 0.6,
                velocity_smoothing: 0.3,
                min_cutoff: 0.5,
                beta: 2.5,
                derivative_cutoff: 1.0,
            },
            Self::Steady => StabilizerParams {
                dead_zone: 0.006,
                jitter_threshold: 0.012,
                prediction_strength: 0.3,
                velocity_smoothing: 0.25,
                min_cutoff: 0.3,
                beta: 1.2,
                derivative_cutoff: 1.0,
            },
        }
    }
}

impl Default for StabilizationMode {
    fn default() -> Self {
        Self::Balanced
    }
}

/// Applies per-point stabilization uniformly across all 21 landmarks
pub struct LandmarkSetStabilizer {
    mode: StabilizationMode,
    bank: Vec<PointStabilizer>,
}

impl LandmarkSetStabilizer {
    #[must_use]
    pub fn new(mode: StabilizationMode) -> Self {
        Self {
            mode,
            bank: Self::build_bank(mode.params()),
        }
    }

    fn build_bank(params: StabilizerParams) -> Vec<PointStabilizer> {
        (0..NUM_HAND_LANDMARKS)
            .map(|_| PointStabilizer::new(params))
            .collect()
    }

    /// Stabilize one full landmark set. Timestamp is in milliseconds.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the slice does not hold exactly 21
    /// landmarks; every downstream index is positionally meaningful, so a
    /// partial hand must fail loudly rather than be truncated or padded.
    /// No internal state is touched on the error path.
    pub fn apply(&mut self, landmarks: &[Landmark], timestamp_ms: f64) -> Result<Vec<Landmark>> {
        if landmarks.len() != NUM_HAND_LANDMARKS {
            return Err(Error::InvalidInput(format!(
                "Expected {} landmarks, got {}",
                NUM_HAND_LANDMARKS,
                landmarks.len()
            )));
        }

        let timestamp = timestamp_ms / 1000.0;
        Ok(landmarks
            .iter()
            .zip(self.bank.iter_mut())
            .map(|(point, stabilizer)| stabilizer.update(*point, timestamp))
            .collect())
    }

    /// Reconfigure the bank.
    ///
    /// A mode switch rebuilds all 21 stabilizers atomically from the named
    /// preset, discarding in-flight state (stale state under new dynamics is
    /// worse than a one-frame snap). Overrides alone merge into the live
    /// filters without a reset.
    pub fn configure(&mut self, mode: Option<StabilizationMode>, overrides: Option<&StabilizerOverrides>) {
        if let Some(mode) = mode {
            if mode != self.mode {
                log::debug!("Stabilization preset {} -> {}, resetting filter bank", self.mode.name(), mode.name());
                self.mode = mode;
                self.bank = Self::build_bank(mode.params());
            }
        }
        if let Some(overrides) = overrides {
            for stabilizer in &mut self.bank {
                stabilizer.configure(overrides);
            }
        }
    }

    /// Clear all running state, keeping mode and parameters
    pub fn reset(&mut self) {
        for stabilizer in &mut self.bank {
            stabilizer.reset();
        }
    }

    #[must_use]
    pub fn mode(&self) -> StabilizationMode {
        self.mode
    }
}
