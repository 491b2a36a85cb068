//! Palm/back orientation classification.
//!
//! Orientation is derived from the raw (not stabilized) landmarks because a
//! real hand flip must not lag behind the detector. Three geometric signals
//! are combined: the palm-plane normal from two wrist-to-base edge vectors,
//! whether the finger bases sit closer to the camera than the wrist, and
//! whether the fingertips sit farther than the bases. The continuous score
//! is the smoother, earlier signal; the discrete label is hysteretic and
//! time-debounced for behaviors that must not be continuously blended.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_DEPTH_GAIN, DEFAULT_ORIENTATION_DEBOUNCE_MS, DEFAULT_ORIENTATION_HYSTERESIS,
    DEFAULT_SCORE_ALPHA, DEFAULT_TRANSITION_RATE, GEOMETRY_EPSILON, ORIENTATION_BASES_WEIGHT,
    ORIENTATION_NORMAL_WEIGHT, ORIENTATION_TIPS_WEIGHT,
};
use crate::filters::ScalarEma;
use crate::landmarks::{
    Handedness, Landmark, INDEX_MCP, INDEX_TIP, MIDDLE_MCP, MIDDLE_TIP, PINKY_MCP, PINKY_TIP,
    RING_MCP, RING_TIP, WRIST,
};

/// Discrete orientation label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandOrientation {
    Palm,
    Back,
    Unknown,
}

/// Per-frame orientation output
#[derive(Debug, Clone, Copy)]
pub struct OrientationState {
    /// Discrete, hysteretic label
    pub label: HandOrientation,
    /// EMA-smoothed continuous score in [-1,1]; positive means palm
    pub score: f64,
    /// Cross-fade scalar in [0,1]; 1 = fully palm, 0 = fully back
    pub transition: f64,
}

/// Orientation classifier tunables
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct OrientationParams {
    /// Hysteresis band: the label flips only past +/- this score
    pub hysteresis: f64,
    /// Minimum dwell between accepted flips (milliseconds)
    pub debounce_ms: f64,
    /// EMA alpha for the continuous score
    pub score_alpha: f64,
    /// Gain normalizing the z-depth statistics against the unit normal
    pub depth_gain: f64,
    /// Exponential approach rate of the transition scalar (1/s)
    pub transition_rate: f64,
}

impl Default for OrientationParams {
    fn default() -> Self {
        Self {
            hysteresis: DEFAULT_ORIENTATION_HYSTERESIS,
            debounce_ms: DEFAULT_ORIENTATION_DEBOUNCE_MS,
            score_alpha: DEFAULT_SCORE_ALPHA,
            depth_gain: DEFAULT_DEPTH_GAIN,
            transition_rate: DEFAULT_TRANSITION_RATE,
        }
    }
}

/// Score-to-label state machine: hysteresis band plus time debounce.
///
/// While "palm", only a score below -hysteresis flips the label; while
/// "back", only a score above +hysteresis does. A flip is additionally
/// rejected until `debounce_ms` has elapsed since the last accepted one.
#[derive(Debug, Clone)]
pub struct LabelHysteresis {
    hysteresis: f64,
    debounce_ms: f64,
    label: HandOrientation,
    last_flip_ms: Option<f64>,
}

impl LabelHysteresis {
    #[must_use]
    pub fn new(hysteresis: f64, debounce_ms: f64) -> Self {
        Self {
            hysteresis,
            debounce_ms,
            label: HandOrientation::Unknown,
            last_flip_ms: None,
        }
    }

    pub fn update(&mut self, score: f64, timestamp_ms: f64) -> HandOrientation {
        match self.label {
            HandOrientation::Unknown => {
                // Initial assignment takes the sign directly, no debounce
                if score > 0.0 {
                    self.label = HandOrientation::Palm;
                    self.last_flip_ms = Some(timestamp_ms);
                } else if score < 0.0 {
                    self.label = HandOrientation::Back;
                    self.last_flip_ms = Some(timestamp_ms);
                }
            }
            HandOrientation::Palm => {
                if score < -self.hysteresis && self.debounce_elapsed(timestamp_ms) {
                    self.label = HandOrientation::Back;
                    self.last_flip_ms = Some(timestamp_ms);
                }
            }
            HandOrientation::Back => {
                if score > self.hysteresis && self.debounce_elapsed(timestamp_ms) {
                    self.label = HandOrientation::Palm;
                    self.last_flip_ms = Some(timestamp_ms);
                }
            }
        }
        self.label
    }

    fn debounce_elapsed(&self, timestamp_ms: f64) -> bool {
        self.last_flip_ms
            .map_or(true, |last| timestamp_ms - last >= self.debounce_ms)
    }

    pub fn reset(&mut self) {
        self.label = HandOrientation::Unknown;
        self.last_flip_ms = None;
    }

    #[must_use]
    pub fn label(&self) -> HandOrientation {
        self.label
    }
}

/// Derives palmness score, discrete label, and the cross-fade scalar
pub struct OrientationClassifier {
    params: OrientationParams,
    score_ema: ScalarEma,
    hysteresis: LabelHysteresis,
    transition: Option<f64>,
    last_timestamp_ms: Option<f64>,
}

impl OrientationClassifier {
    #[must_use]
    pub fn new(params: OrientationParams) -> Self {
        Self {
            params,
            score_ema: ScalarEma::new(params.score_alpha),
            hysteresis: LabelHysteresis::new(params.hysteresis, params.debounce_ms),
            transition: None,
            last_timestamp_ms: None,
        }
    }

    /// Classify one frame from raw landmarks. The caller guarantees the
    /// full 21-point set.
    pub fn update(
        &mut self,
        landmarks: &[Landmark],
        handedness: Option<Handedness>,
        timestamp_ms: f64,
    ) -> OrientationState {
        debug_assert_eq!(landmarks.len(), crate::constants::NUM_HAND_LANDMARKS);

        let raw_score = Self::raw_score(landmarks, handedness, self.params.depth_gain);
        let score = self.score_ema.update(raw_score);
        let label = self.hysteresis.update(score, timestamp_ms);

        let dt = self
            .last_timestamp_ms
            .map_or(0.0, |last| ((timestamp_ms - last) / 1000.0).max(0.0));
        self.last_timestamp_ms = Some(timestamp_ms);

        let target = match label {
            HandOrientation::Palm => 1.0,
            HandOrientation::Back => 0.0,
            HandOrientation::Unknown => 0.5,
        };
        let transition = match self.transition {
            // First frame after construction or reset: no blend from stale state
            None => target,
            Some(current) => {
                let approach = 1.0 - (-self.params.transition_rate * dt).exp();
                current + (target - current) * approach
            }
        };
        self.transition = Some(transition);

        OrientationState {
            label,
            score,
            transition,
        }
    }

    fn raw_score(landmarks: &[Landmark], handedness: Option<Handedness>, depth_gain: f64) -> f64 {
        let wrist = landmarks[WRIST];
        let index_base = landmarks[INDEX_MCP];
        let pinky_base = landmarks[PINKY_MCP];

        // Palm-plane normal from the two wrist-to-base edges. The edge
        // order is chosen so the normal leaves the palm side of a right
        // hand in the mirrored screen coordinate system (x right, y down).
        let edge_index = Vector3::new(
            index_base.x - wrist.x,
            index_base.y - wrist.y,
            index_base.z - wrist.z,
        );
        let edge_pinky = Vector3::new(
            pinky_base.x - wrist.x,
            pinky_base.y - wrist.y,
            pinky_base.z - wrist.z,
        );
        let normal = edge_pinky.cross(&edge_index);
        let normal_term = if normal.norm() > GEOMETRY_EPSILON {
            // Toward the camera is the -z direction
            -normal.normalize().z
        } else {
            0.0
        };

        let bases_z = (landmarks[INDEX_MCP].z
            + landmarks[MIDDLE_MCP].z
            + landmarks[RING_MCP].z
            + landmarks[PINKY_MCP].z)
            / 4.0;
        let tips_z = (landmarks[INDEX_TIP].z
            + landmarks[MIDDLE_TIP].z
            + landmarks[RING_TIP].z
            + landmarks[PINKY_TIP].z)
            / 4.0;

        // Smaller z is closer: bases in front of the wrist and tips behind
        // the bases both point to a camera-facing palm
        let bases_term = (wrist.z - bases_z) * depth_gain;
        let tips_term = (tips_z - bases_z) * depth_gain;

        let mut score = (ORIENTATION_NORMAL_WEIGHT * normal_term
            + ORIENTATION_BASES_WEIGHT * bases_term
            + ORIENTATION_TIPS_WEIGHT * tips_term)
            .tanh();

        // Mirrored-camera geometry flips the sign convention for the left hand
        if handedness == Some(Handedness::Left) {
            score = -score;
        }
        score
    }

    /// Clear all running state
    pub fn reset(&mut self) {
        self.score_ema.reset();
        self.hysteresis.reset();
        self.transition = None;
        self.last_timestamp_ms = None;
    }
}
