//! Per-frame pipeline orchestration.
//!
//! One call per animation frame: stabilize the landmark set, classify
//! orientation, resolve the anchor, compose the object transform. A frame
//! without a hand is not an error; it triggers a total reset of all running
//! state so reacquisition never extrapolates from stale pre-occlusion data,
//! and the object falls back to an idle spin.

use nalgebra::Vector2;

use crate::anchor::PoseAnchorResolver;
use crate::camera::{CameraModel, ViewportMapping};
use crate::config::Config;
use crate::filters::{LandmarkSetStabilizer, SmoothingLaw, StabilizationMode, StabilizerOverrides};
use crate::landmarks::HandFrame;
use crate::orientation::{HandOrientation, OrientationClassifier, OrientationState};
use crate::transform::{AssetCalibration, ObjectTransform, TransformComposer};
use crate::Result;

/// Per-frame pipeline result
#[derive(Debug, Clone, Copy)]
pub struct FrameOutput {
    /// Transform to apply to the virtual object's root node
    pub transform: ObjectTransform,
    /// Orientation score and label, exposed for other consumers
    pub orientation: OrientationState,
    /// Combined motion attenuation used this frame (1.0 while idle)
    pub attenuation: f64,
    /// Whether a hand drove this frame
    pub tracking: bool,
    /// Final screen-space anchor, when pose computation ran
    pub anchor: Option<Vector2<f64>>,
}

/// The complete stabilization and pose-derivation core
pub struct RingPipeline {
    stabilizer: LandmarkSetStabilizer,
    orientation: OrientationClassifier,
    anchor: PoseAnchorResolver,
    composer: TransformComposer,
    camera: CameraModel,
    viewport: ViewportMapping,
    law: SmoothingLaw,
    input_age_s: f64,
    tracking: bool,
    last_timestamp_ms: Option<f64>,
    last_transform: Option<ObjectTransform>,
}

impl RingPipeline {
    /// Build a pipeline from a validated configuration. Asset calibration
    /// is resolved here, once, not per frame.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        let mode = StabilizationMode::from_name(&config.stabilization.preset)?;
        let mut stabilizer = LandmarkSetStabilizer::new(mode);
        stabilizer.configure(None, Some(&config.stabilization.overrides));

        let calibration = AssetCalibration::new(
            config.asset.calibrations.clone(),
            config.asset.default_ratio,
        );
        let ratio = calibration.resolve(config.asset.active.as_deref());
        log::info!(
            "Ring pipeline ready: preset={}, asset={}, calibration ratio={ratio}",
            mode.name(),
            config.asset.active.as_deref().unwrap_or("<default>"),
        );

        Ok(Self {
            stabilizer,
            orientation: OrientationClassifier::new(config.orientation),
            anchor: PoseAnchorResolver::new(config.anchor),
            composer: TransformComposer::new(config.transform.clone(), ratio),
            camera: CameraModel::new(config.camera.fov_y_degrees, config.camera.video_aspect),
            viewport: ViewportMapping::new(config.camera.video_aspect, config.camera.container_aspect),
            law: config.smoothing,
            input_age_s: config.input_age_s,
            tracking: false,
            last_timestamp_ms: None,
            last_transform: None,
        })
    }

    /// Process one detector frame.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when a landmark set is present but does not
    /// hold exactly 21 points. An absent hand is not an error.
    pub fn process(&mut self, frame: &HandFrame) -> Result<FrameOutput> {
        let dt = self
            .last_timestamp_ms
            .map_or(0.0, |last| ((frame.timestamp_ms - last) / 1000.0).max(0.0));

        let Some(landmarks) = frame.landmarks.as_ref() else {
            self.last_timestamp_ms = Some(frame.timestamp_ms);
            if self.tracking {
                log::debug!("Hand lost, resetting all running state");
                self.reset();
            }
            return Ok(FrameOutput {
                transform: self.composer.idle(dt),
                orientation: OrientationState {
                    label: HandOrientation::Unknown,
                    score: 0.0,
                    transition: 0.5,
                },
                attenuation: 1.0,
                tracking: false,
                anchor: None,
            });
        };

        let stabilized = self.stabilizer.apply(landmarks, frame.timestamp_ms)?;
        self.last_timestamp_ms = Some(frame.timestamp_ms);
        if !self.tracking {
            log::debug!("Hand reacquired at t={}ms", frame.timestamp_ms);
            self.tracking = true;
        }

        let orientation = self
            .orientation
            .update(landmarks, frame.handedness, frame.timestamp_ms);

        let resolved = self.anchor.resolve(
            landmarks,
            &stabilized,
            frame.timestamp_ms,
            self.input_age_s,
            &self.law,
            &self.camera,
            &self.viewport,
        );

        match resolved {
            Some(resolved) => {
                let transform = self.composer.compose(
                    &resolved,
                    landmarks,
                    &orientation,
                    frame.handedness,
                    dt,
                    &self.law,
                    &self.camera,
                );
                self.last_transform = Some(transform);
                Ok(FrameOutput {
                    transform,
                    orientation,
                    attenuation: resolved.attenuation,
                    tracking: true,
                    anchor: Some(resolved.screen),
                })
            }
            None => {
                // A joint went non-finite: skip pose computation for this
                // frame rather than snapping the object to a default
                let transform = self
                    .last_transform
                    .unwrap_or_else(|| self.composer.idle(dt));
                Ok(FrameOutput {
                    transform,
                    orientation,
                    attenuation: 1.0,
                    tracking: true,
                    anchor: None,
                })
            }
        }
    }

    /// Switch the stabilization preset, discarding filter state
    pub fn set_preset(&mut self, mode: StabilizationMode) {
        self.stabilizer.configure(Some(mode), None);
    }

    /// Merge stabilizer parameter overrides into the live filters
    pub fn tune(&mut self, overrides: &StabilizerOverrides) {
        self.stabilizer.configure(None, Some(overrides));
    }

    /// Rebuild the whole pipeline from a new configuration. All running
    /// state is discarded; the result is indistinguishable from a freshly
    /// constructed pipeline.
    pub fn reconfigure(&mut self, config: &Config) -> Result<()> {
        *self = Self::new(config)?;
        Ok(())
    }

    /// Total reset of every running estimate
    pub fn reset(&mut self) {
        self.stabilizer.reset();
        self.orientation.reset();
        self.anchor.reset();
        self.composer.reset();
        self.tracking = false;
        self.last_transform = None;
    }

    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    #[must_use]
    pub fn mode(&self) -> StabilizationMode {
        self.stabilizer.mode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{Handedness, Landmark};

    fn hand() -> Vec<Landmark> {
        (0..21)
            .map(|i| Landmark::new(0.3 + 0.015 * f64::from(i), 0.5, -0.05))
            .collect()
    }

    #[test]
    fn test_idle_frame_output() {
        let mut pipeline = RingPipeline::new(&Config::default()).unwrap();
        let out = pipeline.process(&HandFrame::empty(0.0)).unwrap();
        assert!(!out.tracking);
        assert!(out.anchor.is_none());
        assert_eq!(out.orientation.label, HandOrientation::Unknown);
    }

    #[test]
    fn test_tracked_frame_output() {
        let mut pipeline = RingPipeline::new(&Config::default()).unwrap();
        let frame = HandFrame::tracked(hand(), Handedness::Right, 0.0);
        let out = pipeline.process(&frame).unwrap();
        assert!(out.tracking);
        assert!(out.anchor.is_some());
        assert!(pipeline.is_tracking());
    }

    #[test]
    fn test_short_hand_is_loud() {
        let mut pipeline = RingPipeline::new(&Config::default()).unwrap();
        let frame = HandFrame::tracked(vec![Landmark::default(); 20], Handedness::Right, 0.0);
        assert!(pipeline.process(&frame).is_err());
    }

    #[test]
    fn test_idle_spin_advances() {
        let mut pipeline = RingPipeline::new(&Config::default()).unwrap();
        let a = pipeline.process(&HandFrame::empty(0.0)).unwrap();
        let b = pipeline.process(&HandFrame::empty(16.67)).unwrap();
        assert!(b.transform.rotation.y > a.transform.rotation.y);
    }
}
