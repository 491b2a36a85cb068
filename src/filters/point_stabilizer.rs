//! Per-landmark 3-D point stabilization.
//!
//! Combines three motion regimes with different responses: displacements
//! below the dead zone are treated as sensor noise and only adaptively
//! filtered, displacements below the jitter threshold are filtered without
//! prediction, and fast intentional motion is extrapolated forward to
//! compensate for detection and render latency before the final filter pass.

use std::collections::VecDeque;

use nalgebra::Vector3;

use crate::constants::{DT_EPSILON, PREDICTION_VELOCITY_FLOOR, VELOCITY_HISTORY_LEN};
use crate::filters::one_euro::{OneEuroFilter, OneEuroParams};
use crate::landmarks::Landmark;

/// Full tunable set for one point stabilizer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilizerParams {
    /// Displacement below which motion is treated as noise
    pub dead_zone: f64,
    /// Displacement band above the dead zone, still treated as jitter
    pub jitter_threshold: f64,
    /// Forward extrapolation horizon as a multiple of the frame interval
    pub prediction_strength: f64,
    /// Lerp factor for the smoothed velocity estimate
    pub velocity_smoothing: f64,
    /// Adaptive filter minimum cutoff (Hz)
    pub min_cutoff: f64,
    /// Adaptive filter speed coefficient
    pub beta: f64,
    /// Adaptive filter derivative cutoff (Hz)
    pub derivative_cutoff: f64,
}

/// Partial override merged into live params without a state reset
#[derive(Debug, Clone, Copy, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StabilizerOverrides {
    pub dead_zone: Option<f64>,
    pub jitter_threshold: Option<f64>,
    pub prediction_strength: Option<f64>,
    pub velocity_smoothing: Option<f64>,
    pub min_cutoff: Option<f64>,
    pub beta: Option<f64>,
    pub derivative_cutoff: Option<f64>,
}

impl StabilizerParams {
    /// Apply a partial override in place
    pub fn merge(&mut self, overrides: &StabilizerOverrides) {
        if let Some(v) = overrides.dead_zone {
            self.dead_zone = v;
        }
        if let Some(v) = overrides.jitter_threshold {
            self.jitter_threshold = v;
        }
        if let Some(v) = overrides.prediction_strength {
            self.prediction_strength = v;
        }
        if let Some(v) = overrides.velocity_smoothing {
            self.velocity_smoothing = v;
        }
        if let Some(v) = overrides.min_cutoff {
            self.min_cutoff = v;
        }
        if let Some(v) = overrides.beta {
            self.beta = v;
        }
        if let Some(v) = overrides.derivative_cutoff {
            self.derivative_cutoff = v;
        }
    }

    fn filter_params(&self) -> OneEuroParams {
        OneEuroParams {
            min_cutoff: Some(self.min_cutoff),
            beta: Some(self.beta),
            derivative_cutoff: Some(self.derivative_cutoff),
        }
    }
}

/// Stabilizes one 3-D landmark end to end
#[derive(Debug, Clone)]
pub struct PointStabilizer {
    params: StabilizerParams,
    filter_x: OneEuroFilter,
    filter_y: OneEuroFilter,
    filter_z: OneEuroFilter,
    prev: Option<(Landmark, f64)>,
    velocity_history: VecDeque<Vector3<f64>>,
    smoothed_velocity: Vector3<f64>,
    last_instant_velocity: Vector3<f64>,
    acceleration: Vector3<f64>,
}

impl PointStabilizer {
    #[must_use]
    pub fn new(params: StabilizerParams) -> Self {
        Self {
            params,
            filter_x: OneEuroFilter::new(params.min_cutoff, params.beta, params.derivative_cutoff),
            filter_y: OneEuroFilter::new(params.min_cutoff, params.beta, params.derivative_cutoff),
            filter_z: OneEuroFilter::new(params.min_cutoff, params.beta, params.derivative_cutoff),
            prev: None,
            velocity_history: VecDeque::with_capacity(VELOCITY_HISTORY_LEN),
            smoothed_velocity: Vector3::zeros(),
            last_instant_velocity: Vector3::zeros(),
            acceleration: Vector3::zeros(),
        }
    }

    fn filter_point(&mut self, point: Landmark, timestamp: f64) -> Landmark {
        Landmark::new(
            self.filter_x.update(point.x, timestamp),
            self.filter_y.update(point.y, timestamp),
            self.filter_z.update(point.z, timestamp),
        )
    }

    /// Stabilize one sample. Timestamp is in seconds.
    pub fn update(&mut self, point: Landmark, timestamp: f64) -> Landmark {
        let Some((prev_point, prev_timestamp)) = self.prev else {
            let seeded = self.filter_point(point, timestamp);
            self.prev = Some((seeded, timestamp));
            return seeded;
        };

        let dt = timestamp - prev_timestamp;
        if dt <= DT_EPSILON {
            return prev_point;
        }

        let delta = Vector3::new(
            point.x - prev_point.x,
            point.y - prev_point.y,
            point.z - prev_point.z,
        );
        let magnitude = delta.norm();

        if magnitude < self.params.dead_zone {
            // Noise regime: keep filtering the raw point instead of freezing,
            // a hard hold shows as a "stuck" artifact under sustained tremor.
            let out = self.filter_point(point, timestamp);
            self.prev = Some((out, timestamp));
            return out;
        }

        let instant_velocity = delta / dt;
        if self.velocity_history.len() >= VELOCITY_HISTORY_LEN {
            self.velocity_history.pop_front();
        }
        self.velocity_history.push_back(instant_velocity);
        let average_velocity = self
            .velocity_history
            .iter()
            .fold(Vector3::zeros(), |acc, v| acc + v)
            / self.velocity_history.len() as f64;

        self.acceleration = (instant_velocity - self.last_instant_velocity) / dt;
        self.last_instant_velocity = instant_velocity;
        self.smoothed_velocity +=
            (instant_velocity - self.smoothed_velocity) * self.params.velocity_smoothing;

        let out = if magnitude < self.params.jitter_threshold {
            // Jitter regime: adaptive filter only, no extrapolation
            self.filter_point(point, timestamp)
        } else if average_velocity.norm() > PREDICTION_VELOCITY_FLOOR {
            let horizon = dt * self.params.prediction_strength;
            let predicted = Landmark::new(
                (point.x + average_velocity.x * horizon + 0.5 * self.acceleration.x * horizon * horizon)
                    .clamp(0.0, 1.0),
                (point.y + average_velocity.y * horizon + 0.5 * self.acceleration.y * horizon * horizon)
                    .clamp(0.0, 1.0),
                (point.z + average_velocity.z * horizon + 0.5 * self.acceleration.z * horizon * horizon)
                    .clamp(-1.0, 1.0),
            );
            self.filter_point(predicted, timestamp)
        } else {
            self.filter_point(point, timestamp)
        };

        self.prev = Some((out, timestamp));
        out
    }

    /// Clear all running state
    pub fn reset(&mut self) {
        self.filter_x.reset();
        self.filter_y.reset();
        self.filter_z.reset();
        self.prev = None;
        self.velocity_history.clear();
        self.smoothed_velocity = Vector3::zeros();
        self.last_instant_velocity = Vector3::zeros();
        self.acceleration = Vector3::zeros();
    }

    /// Merge a partial parameter update without resetting state
    pub fn configure(&mut self, overrides: &StabilizerOverrides) {
        self.params.merge(overrides);
        let filter_params = self.params.filter_params();
        self.filter_x.configure(&filter_params);
        self.filter_y.configure(&filter_params);
        self.filter_z.configure(&filter_params);
    }

    #[must_use]
    pub fn params(&self) -> &StabilizerParams {
        &self.params
    }
}
