//! Final object transform composition.
//!
//! Converts the resolved anchor, smoothed finger diameter, depth estimate,
//! and orientation state into the scale, position, and rotation applied to
//! the virtual ring, plus a clip plane that hides the hemisphere of the
//! band that would be occluded by the finger.

use std::collections::HashMap;
use std::f64::consts::PI;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::anchor::ResolvedAnchor;
use crate::camera::CameraModel;
use crate::closure::hand_closure;
use crate::constants::{
    DEFAULT_CALIBRATION_RATIO, DEFAULT_FINGER_DIAMETER_RATIO, DEFAULT_IDLE_SPIN_RATE,
    DEFAULT_SCALE_MAX, DEFAULT_SCALE_MIN, GEOMETRY_EPSILON,
};
use crate::filters::SmoothingLaw;
use crate::landmarks::{Handedness, Landmark, RING_MCP, RING_PIP};
use crate::orientation::{HandOrientation, OrientationState};

/// Ring-asset calibration: maps a stable asset identifier to the ratio of
/// the model's inner diameter to its bounding box. Resolved once when the
/// pipeline is built, never re-looked-up per frame.
#[derive(Debug, Clone)]
pub struct AssetCalibration {
    ratios: HashMap<String, f64>,
    default_ratio: f64,
}

impl AssetCalibration {
    #[must_use]
    pub fn new(ratios: HashMap<String, f64>, default_ratio: f64) -> Self {
        Self {
            ratios,
            default_ratio,
        }
    }

    /// Ratio for the given asset, falling back to the default
    #[must_use]
    pub fn resolve(&self, asset_id: Option<&str>) -> f64 {
        asset_id
            .and_then(|id| self.ratios.get(id).copied())
            .unwrap_or(self.default_ratio)
    }
}

impl Default for AssetCalibration {
    fn default() -> Self {
        Self {
            ratios: HashMap::new(),
            default_ratio: DEFAULT_CALIBRATION_RATIO,
        }
    }
}

/// Transform composer tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformParams {
    /// Base-to-joint segment length to finger diameter (anatomical ratio)
    pub finger_diameter_ratio: f64,
    /// Snugness adjustment driven by the absolute orientation score
    pub fit_adjust: f64,
    /// Extra scale while the hand closes into a fist (back orientation only)
    pub closure_scale_boost: f64,
    /// Pull toward the camera at full closure, meters
    pub closure_pullback: f64,
    pub scale_min: f64,
    pub scale_max: f64,
    /// Constant world-space offset added to the anchor position
    pub base_offset: [f64; 3],
    /// Vertical hug offset as a fraction of the finger radius
    pub hug_offset_gain: f64,
    /// Tilt response to the continuous orientation score
    pub tilt_gain: f64,
    /// Clamp on the score-driven tilt, radians
    pub max_tilt: f64,
    /// Target rotation with the back of the hand visible (right-hand values)
    pub back_rotation: [f64; 3],
    /// Target rotation with the palm visible (right-hand values)
    pub palm_rotation: [f64; 3],
    /// User rotation offset composed onto the blended rotation
    pub rotation_offset: [f64; 3],
    /// Multiplier on the shared alpha for the z channel, which is the most
    /// jitter-sensitive axis visually
    pub z_rotation_smoothing: f64,
    pub idle_spin_rate: f64,
    pub idle_scale: f64,
}

impl Default for TransformParams {
    fn default() -> Self {
        Self {
            finger_diameter_ratio: DEFAULT_FINGER_DIAMETER_RATIO,
            fit_adjust: 0.12,
            closure_scale_boost: 0.25,
            closure_pullback: 0.035,
            scale_min: DEFAULT_SCALE_MIN,
            scale_max: DEFAULT_SCALE_MAX,
            base_offset: [0.0, 0.0, 0.0],
            hug_offset_gain: 0.6,
            tilt_gain: 0.5,
            max_tilt: 0.5,
            back_rotation: [-1.45, 0.0, 0.35],
            palm_rotation: [1.45, PI, -0.35],
            rotation_offset: [0.0, 0.0, 0.0],
            z_rotation_smoothing: 0.5,
            idle_spin_rate: DEFAULT_IDLE_SPIN_RATE,
            idle_scale: 0.05,
        }
    }
}

/// The externally-consumed per-frame result
#[derive(Debug, Clone, Copy)]
pub struct ObjectTransform {
    pub position: Vector3<f64>,
    pub scale: f64,
    /// Euler rotation; z additionally carries the view-axis roll
    pub rotation: Vector3<f64>,
    /// Normal of the half-visibility clip plane through `position`
    pub clip_normal: Vector3<f64>,
}

/// Shortest-angular-path interpolation; naive lerp breaks at +/- pi
fn lerp_angle(from: f64, to: f64, t: f64) -> f64 {
    let diff = (to - from + PI).rem_euclid(2.0 * PI) - PI;
    from + diff * t
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Composes the final scale/position/rotation for the virtual object
pub struct TransformComposer {
    params: TransformParams,
    calibration_ratio: f64,
    smoothed_diameter: Option<f64>,
    smoothed_closure: Option<f64>,
    smoothed_z: Option<f64>,
    clip_normal: Option<Vector3<f64>>,
    idle_angle: f64,
}

impl TransformComposer {
    #[must_use]
    pub fn new(params: TransformParams, calibration_ratio: f64) -> Self {
        Self {
            params,
            calibration_ratio: calibration_ratio.max(GEOMETRY_EPSILON),
            smoothed_diameter: None,
            smoothed_closure: None,
            smoothed_z: None,
            clip_normal: None,
            idle_angle: 0.0,
        }
    }

    /// Compose the transform for one tracked frame
    pub fn compose(
        &mut self,
        anchor: &ResolvedAnchor,
        raw: &[Landmark],
        orientation: &OrientationState,
        handedness: Option<Handedness>,
        dt: f64,
        law: &SmoothingLaw,
        camera: &CameraModel,
    ) -> ObjectTransform {
        let alpha = law.alpha(dt, anchor.attenuation);

        // Finger diameter from the anchor segment; a degenerate segment
        // skips the update and keeps the running estimate
        let segment = raw[RING_MCP].distance_2d(&raw[RING_PIP]);
        if segment > GEOMETRY_EPSILON {
            let target = segment * self.params.finger_diameter_ratio;
            self.smoothed_diameter = Some(match self.smoothed_diameter {
                None => target,
                Some(prev) => lerp(prev, target, alpha),
            });
        }
        let diameter_norm = self.smoothed_diameter.unwrap_or(0.0);

        let closure_target = hand_closure(raw);
        let closure = match self.smoothed_closure {
            None => closure_target,
            Some(prev) => lerp(prev, closure_target, alpha),
        };
        self.smoothed_closure = Some(closure);

        // Normalized diameter to world meters at the smoothed depth, then
        // through the per-asset calibration
        let world_diameter = diameter_norm * camera.world_extent_at(anchor.depth);
        let mut scale = world_diameter / self.calibration_ratio;
        scale *= 1.0 + self.params.fit_adjust * orientation.score.abs();
        if orientation.label == HandOrientation::Back {
            scale *= 1.0 + self.params.closure_scale_boost * closure;
        }
        let scale = scale.clamp(self.params.scale_min, self.params.scale_max);

        // Position: anchor plus the configured offset, a rotation-coupled
        // hug toward the finger, and a closure pull-back along depth
        let hug = (world_diameter / 2.0) * orientation.score * self.params.hug_offset_gain;
        let pullback = if orientation.label == HandOrientation::Back {
            closure * self.params.closure_pullback
        } else {
            0.0
        };
        let position = anchor.world
            + Vector3::new(
                self.params.base_offset[0],
                self.params.base_offset[1] + hug,
                self.params.base_offset[2] + pullback,
            );

        let rotation = self.compose_rotation(raw, orientation, handedness, alpha);
        let clip_normal = self.blend_clip_normal(position, orientation.transition);

        ObjectTransform {
            position,
            scale,
            rotation,
            clip_normal,
        }
    }

    fn compose_rotation(
        &mut self,
        raw: &[Landmark],
        orientation: &OrientationState,
        handedness: Option<Handedness>,
        alpha: f64,
    ) -> Vector3<f64> {
        let sign = match handedness {
            Some(Handedness::Left) => -1.0,
            _ => 1.0,
        };
        let tilt = (orientation.score * self.params.tilt_gain)
            .clamp(-self.params.max_tilt, self.params.max_tilt)
            * sign;

        // Left hands mirror the y and z angle conventions
        let back = Vector3::new(
            self.params.back_rotation[0] + tilt,
            self.params.back_rotation[1] * sign,
            self.params.back_rotation[2] * sign,
        );
        let palm = Vector3::new(
            self.params.palm_rotation[0] + tilt,
            self.params.palm_rotation[1] * sign,
            self.params.palm_rotation[2] * sign,
        );
        let blended = back + (palm - back) * orientation.transition;

        // View-axis roll follows the on-screen angle of the anchor segment.
        // The render scene is mirrored relative to landmark space, so the
        // x delta flips sign; a segment pointing straight up is roll zero.
        let dx = raw[RING_PIP].x - raw[RING_MCP].x;
        let dy = raw[RING_PIP].y - raw[RING_MCP].y;
        let roll = if dx.abs() > GEOMETRY_EPSILON || dy.abs() > GEOMETRY_EPSILON {
            (-dx).atan2(-dy)
        } else {
            self.smoothed_z.unwrap_or(0.0)
        };

        let z_target = blended.z + roll + self.params.rotation_offset[2];
        let z_alpha = (alpha * self.params.z_rotation_smoothing).clamp(0.0, 1.0);
        let z = match self.smoothed_z {
            None => z_target,
            Some(prev) => lerp_angle(prev, z_target, z_alpha),
        };
        self.smoothed_z = Some(z);

        Vector3::new(
            blended.x + self.params.rotation_offset[0],
            blended.y + self.params.rotation_offset[1],
            z,
        )
    }

    /// Clip-plane normal blended between the to-camera direction (palm)
    /// and its negation (back); blending avoids a visible pop at the flip
    fn blend_clip_normal(&mut self, position: Vector3<f64>, transition: f64) -> Vector3<f64> {
        let to_camera = -position;
        if to_camera.norm() < GEOMETRY_EPSILON {
            return self.clip_normal.unwrap_or_else(Vector3::z);
        }
        let to_camera = to_camera.normalize();
        let blended = to_camera * (2.0 * transition - 1.0);
        let normal = if blended.norm() > GEOMETRY_EPSILON {
            blended.normalize()
        } else {
            // Exact midpoint of the flip: hold the previous normal
            self.clip_normal.unwrap_or(to_camera)
        };
        self.clip_normal = Some(normal);
        normal
    }

    /// Waiting affordance while no hand is tracked: a slow continuous spin
    pub fn idle(&mut self, dt: f64) -> ObjectTransform {
        self.idle_angle = (self.idle_angle + self.params.idle_spin_rate * dt.max(0.0))
            .rem_euclid(2.0 * PI);
        ObjectTransform {
            position: Vector3::new(
                self.params.base_offset[0],
                self.params.base_offset[1],
                self.params.base_offset[2],
            ),
            scale: self.params.idle_scale,
            rotation: Vector3::new(0.0, self.idle_angle, 0.0),
            clip_normal: Vector3::z(),
        }
    }

    /// Invalidate all running smoothing state (idle spin phase survives)
    pub fn reset(&mut self) {
        self.smoothed_diameter = None;
        self.smoothed_closure = None;
        self.smoothed_z = None;
        self.clip_normal = None;
    }

    pub fn configure(&mut self, params: TransformParams, calibration_ratio: f64) {
        self.params = params;
        self.calibration_ratio = calibration_ratio.max(GEOMETRY_EPSILON);
    }
}
