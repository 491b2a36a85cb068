//! Anchor resolution: from two finger joints to a stable placement point.
//!
//! The anchor is a weighted point between the ring-finger base and first
//! joint. Several jitter-suppression stages run in sequence, every one of
//! them scaled by a motion-attenuation factor so that smoothing relaxes
//! toward instant response during fast gestures and tightens at rest:
//!
//! 1. raw weighted anchor (+ optional offset along the joint segment)
//! 2. screen-space motion attenuation from frame-to-frame displacement
//! 3. velocity-gated blend toward the stabilized-landmark anchor
//! 4. dead zone with a smoothstep transition band
//! 5. two-speed micro-follow polish
//! 6. cover-crop aspect remap, clamp, x mirror
//! 7. unprojection to a world ray at the smoothed depth estimate
//! 8. world velocity and latency look-ahead
//! 9. world-space speed as a second attenuation source (min-combined)

use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};

use crate::camera::{mirror_x, CameraModel, ViewportMapping};
use crate::constants::{
    DEFAULT_DEPTH_BASE, DEFAULT_DEPTH_SCALE, DEFAULT_MOTION_FLOOR, DEFAULT_MOTION_FULL_SCALE,
    DEFAULT_MOTION_GAMMA, DEFAULT_WORLD_FULL_SCALE, DT_EPSILON, GEOMETRY_EPSILON,
    MAX_CAMERA_DISTANCE, MIN_CAMERA_DISTANCE,
};
use crate::filters::SmoothingLaw;
use crate::landmarks::{Landmark, RING_MCP, RING_PIP};

/// Monotonic power-law attenuation curve with a floor.
///
/// Zero motion maps to 1 (full smoothing applies), motion at or beyond the
/// full scale maps to the floor (smoothing relaxed toward instant response).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionAttenuation {
    pub floor: f64,
    pub full_scale: f64,
    pub gamma: f64,
}

impl Default for MotionAttenuation {
    fn default() -> Self {
        Self {
            floor: DEFAULT_MOTION_FLOOR,
            full_scale: DEFAULT_MOTION_FULL_SCALE,
            gamma: DEFAULT_MOTION_GAMMA,
        }
    }
}

impl MotionAttenuation {
    #[must_use]
    pub fn value(&self, magnitude: f64) -> f64 {
        let t = (magnitude / self.full_scale.max(GEOMETRY_EPSILON)).clamp(0.0, 1.0);
        1.0 - (1.0 - self.floor) * t.powf(self.gamma)
    }
}

/// Anchor resolver tunables
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorParams {
    /// Blend weight between the base joint (0) and the first joint (1)
    pub bias: f64,
    /// Extra normalized offset along the base-to-joint direction
    pub along_offset: f64,
    /// Maximum weight given to the stabilized-landmark anchor
    pub stabilized_blend: f64,
    /// Screen velocity (units/s) at which stabilized data is no longer trusted
    pub stabilized_velocity_cutoff: f64,
    /// Dead-zone radius around the previous anchor
    pub dead_zone: f64,
    /// Width of the smoothstep band outside the dead zone
    pub dead_zone_band: f64,
    /// Per-frame ease toward the target while inside the dead zone
    pub dead_zone_ease: f64,
    /// Displacement above which the micro-follow switches to fast catch-up
    pub micro_threshold: f64,
    pub micro_follow_slow: f64,
    pub micro_follow_fast: f64,
    /// Screen-space attenuation curve (per-frame displacement)
    pub screen_attenuation: MotionAttenuation,
    /// World-space attenuation curve (speed in m/s)
    pub world_attenuation: MotionAttenuation,
    /// Detector z to camera-distance mapping (meters)
    pub depth_base: f64,
    pub depth_scale: f64,
    /// Constant part of the latency look-ahead (seconds)
    pub lookahead_s: f64,
}

impl Default for AnchorParams {
    fn default() -> Self {
        Self {
            bias: 0.35,
            along_offset: 0.0,
            stabilized_blend: 0.5,
            stabilized_velocity_cutoff: 0.5,
            dead_zone: 0.0025,
            dead_zone_band: 0.003,
            dead_zone_ease: 0.12,
            micro_threshold: 0.004,
            micro_follow_slow: 0.35,
            micro_follow_fast: 0.95,
            screen_attenuation: MotionAttenuation::default(),
            world_attenuation: MotionAttenuation {
                floor: DEFAULT_MOTION_FLOOR,
                full_scale: DEFAULT_WORLD_FULL_SCALE,
                gamma: DEFAULT_MOTION_GAMMA,
            },
            depth_base: DEFAULT_DEPTH_BASE,
            depth_scale: DEFAULT_DEPTH_SCALE,
            lookahead_s: 0.03,
        }
    }
}

/// Per-frame resolver output
#[derive(Debug, Clone, Copy)]
pub struct ResolvedAnchor {
    /// Final screen-space anchor in container coordinates, mirrored
    pub screen: Vector2<f64>,
    /// World position including the latency look-ahead
    pub world: Vector3<f64>,
    /// Smoothed camera distance (meters)
    pub depth: f64,
    /// Combined motion attenuation used this frame
    pub attenuation: f64,
}

fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn lerp2(a: Vector2<f64>, b: Vector2<f64>, t: f64) -> Vector2<f64> {
    a + (b - a) * t
}

/// Computes the placement anchor with multi-stage jitter suppression
pub struct PoseAnchorResolver {
    params: AnchorParams,
    prev_raw: Option<(Vector2<f64>, f64)>,
    filtered: Option<Vector2<f64>>,
    micro: Option<Vector2<f64>>,
    world: Option<Vector3<f64>>,
    world_velocity: Vector3<f64>,
    smoothed_depth: Option<f64>,
    world_atten: f64,
}

impl PoseAnchorResolver {
    #[must_use]
    pub fn new(params: AnchorParams) -> Self {
        Self {
            params,
            prev_raw: None,
            filtered: None,
            micro: None,
            world: None,
            world_velocity: Vector3::zeros(),
            smoothed_depth: None,
            world_atten: 1.0,
        }
    }

    fn weighted_anchor(&self, base: Landmark, joint: Landmark) -> (Vector2<f64>, f64) {
        let bias = self.params.bias.clamp(0.0, 1.0);
        let mut anchor = Vector2::new(
            base.x + (joint.x - base.x) * bias,
            base.y + (joint.y - base.y) * bias,
        );
        let z = base.z + (joint.z - base.z) * bias;

        let dir = Vector2::new(joint.x - base.x, joint.y - base.y);
        if self.params.along_offset.abs() > 0.0 && dir.norm() > GEOMETRY_EPSILON {
            anchor += dir.normalize() * self.params.along_offset;
        }
        (anchor, z)
    }

    /// Resolve the anchor for one frame.
    ///
    /// Returns `None` (and leaves all running state untouched) when either
    /// anchor joint carries non-finite coordinates; substituting a default
    /// would snap the object to the origin.
    #[allow(clippy::too_many_arguments)]
    pub fn resolve(
        &mut self,
        raw: &[Landmark],
        stabilized: &[Landmark],
        timestamp_ms: f64,
        input_age_s: f64,
        law: &SmoothingLaw,
        camera: &CameraModel,
        viewport: &ViewportMapping,
    ) -> Option<ResolvedAnchor> {
        let base = raw[RING_MCP];
        let joint = raw[RING_PIP];
        if !base.is_finite() || !joint.is_finite() {
            return None;
        }

        let (anchor, anchor_z) = self.weighted_anchor(base, joint);

        // Screen-space motion attenuation from the raw anchor displacement
        let (dt, displacement) = match self.prev_raw {
            Some((prev, prev_ms)) => (
                ((timestamp_ms - prev_ms) / 1000.0).max(0.0),
                (anchor - prev).norm(),
            ),
            None => (0.0, 0.0),
        };
        let screen_atten = if self.prev_raw.is_some() {
            self.params.screen_attenuation.value(displacement)
        } else {
            1.0
        };
        self.prev_raw = Some((anchor, timestamp_ms));

        // Stabilized data is trusted only when the hand is nearly still
        let (stab_anchor, _) = self.weighted_anchor(stabilized[RING_MCP], stabilized[RING_PIP]);
        let velocity = if dt > DT_EPSILON { displacement / dt } else { 0.0 };
        let trust = (1.0 - velocity / self.params.stabilized_velocity_cutoff).clamp(0.0, 1.0);
        let blended = lerp2(anchor, stab_anchor, self.params.stabilized_blend * trust);

        let attenuation = screen_atten.min(self.world_atten);
        let alpha = law.alpha(dt, attenuation);

        // Dead zone with a soft transition band, then the main smoothing step
        let filtered = match self.filtered {
            None => blended,
            Some(prev) => {
                let d = (blended - prev).norm();
                let eased = lerp2(prev, blended, self.params.dead_zone_ease);
                let target = if d < self.params.dead_zone {
                    eased
                } else if d < self.params.dead_zone + self.params.dead_zone_band {
                    let s = smoothstep((d - self.params.dead_zone) / self.params.dead_zone_band);
                    lerp2(eased, blended, s)
                } else {
                    blended
                };
                lerp2(prev, target, alpha)
            }
        };
        self.filtered = Some(filtered);

        // Micro-follow: final polish with two-speed catch-up
        let micro = match self.micro {
            None => filtered,
            Some(prev) => {
                let rate = if (filtered - prev).norm() > self.params.micro_threshold {
                    self.params.micro_follow_fast
                } else {
                    self.params.micro_follow_slow
                };
                lerp2(prev, filtered, rate)
            }
        };
        self.micro = Some(micro);

        // Container space, mirrored for the on-screen presentation
        let (cx, cy) = viewport.remap(micro.x, micro.y);
        let screen = Vector2::new(mirror_x(cx), cy);

        // Depth from the raw anchor z, smoothed with the same attenuated alpha
        let depth_target = (self.params.depth_base + self.params.depth_scale * anchor_z.clamp(-1.0, 1.0))
            .clamp(MIN_CAMERA_DISTANCE, MAX_CAMERA_DISTANCE);
        let depth = match self.smoothed_depth {
            None => depth_target,
            Some(prev) => prev + (depth_target - prev) * alpha,
        };
        self.smoothed_depth = Some(depth);

        let world_now = camera.point_at_depth(screen.x, screen.y, depth);

        // World velocity feeds both the look-ahead and the second
        // attenuation source for the next frame
        if let Some(prev_world) = self.world {
            if dt > DT_EPSILON {
                let instant = (world_now - prev_world) / dt;
                self.world_velocity += (instant - self.world_velocity) * 0.5;
            }
        }
        self.world = Some(world_now);
        self.world_atten = self.params.world_attenuation.value(self.world_velocity.norm());

        let lookahead = self.params.lookahead_s + input_age_s.max(0.0);
        let world = world_now + self.world_velocity * lookahead;

        Some(ResolvedAnchor {
            screen,
            world,
            depth,
            attenuation,
        })
    }

    /// Invalidate every running estimate. The next frame re-seeds from its
    /// own sample, with no memory of the pre-loss trajectory.
    pub fn reset(&mut self) {
        self.prev_raw = None;
        self.filtered = None;
        self.micro = None;
        self.world = None;
        self.world_velocity = Vector3::zeros();
        self.smoothed_depth = None;
        self.world_atten = 1.0;
    }

    pub fn configure(&mut self, params: AnchorParams) {
        self.params = params;
    }

    #[must_use]
    pub fn params(&self) -> &AnchorParams {
        &self.params
    }
}
