//! Configuration management for the ring pose pipeline.
//!
//! Every tunable enumerated by the component modules is independently
//! overridable here. Parameter tweaks (stabilizer overrides, smoothing
//! slider) take effect immediately; switching the named preset or
//! rebuilding from a new `Config` resets running state.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::anchor::AnchorParams;
use crate::constants::DEFAULT_CALIBRATION_RATIO;
use crate::filters::{SmoothingLaw, StabilizationMode, StabilizerOverrides};
use crate::orientation::OrientationParams;
use crate::transform::TransformParams;
use crate::{Error, Result};

/// Full pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Landmark stabilization preset and live overrides
    pub stabilization: StabilizationConfig,

    /// Shared latency/smoothness trade-off law
    pub smoothing: SmoothingLaw,

    /// Palm/back classification
    pub orientation: OrientationParams,

    /// Anchor resolution
    pub anchor: AnchorParams,

    /// Object transform composition
    pub transform: TransformParams,

    /// Camera and viewport geometry
    pub camera: CameraConfig,

    /// Ring asset calibration
    pub asset: AssetConfig,

    /// Assumed capture-to-process age of each frame (seconds), added to
    /// the anchor look-ahead
    pub input_age_s: f64,
}

/// Stabilization preset selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilizationConfig {
    /// Named preset: responsive, balanced, smooth, or steady
    pub preset: String,

    /// Partial overrides merged into the live filters without a reset
    pub overrides: StabilizerOverrides,
}

impl Default for StabilizationConfig {
    fn default() -> Self {
        Self {
            preset: StabilizationMode::default().name().to_string(),
            overrides: StabilizerOverrides::default(),
        }
    }
}

/// Camera and viewport geometry
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov_y_degrees: f64,

    /// Aspect ratio of the camera video frame
    pub video_aspect: f64,

    /// Aspect ratio of the container the video fills (cover crop)
    pub container_aspect: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 60.0,
            video_aspect: 16.0 / 9.0,
            container_aspect: 16.0 / 9.0,
        }
    }
}

/// Ring asset calibration records
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Identifier of the active ring model
    pub active: Option<String>,

    /// Asset identifier to inner-diameter ratio
    pub calibrations: HashMap<String, f64>,

    /// Ratio used when the active asset has no record
    pub default_ratio: f64,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            active: None,
            calibrations: HashMap::new(),
            default_ratio: DEFAULT_CALIBRATION_RATIO,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        StabilizationMode::from_name(&self.stabilization.preset)
            .map_err(|_| Error::ConfigError(format!(
                "Unknown stabilization preset: {}",
                self.stabilization.preset
            )))?;

        if self.smoothing.responsiveness <= 0.0 {
            return Err(Error::ConfigError(
                "Smoothing responsiveness must be positive".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.smoothing.base_strength) {
            return Err(Error::ConfigError(
                "Smoothing base strength must be in [0, 1)".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.smoothing.slider) {
            return Err(Error::ConfigError(
                "Smoothing slider must be between 0.0 and 1.0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.orientation.hysteresis) {
            return Err(Error::ConfigError(
                "Orientation hysteresis must be between 0.0 and 1.0".to_string(),
            ));
        }
        if self.orientation.debounce_ms < 0.0 {
            return Err(Error::ConfigError(
                "Orientation debounce must be non-negative".to_string(),
            ));
        }
        if !(0.0 < self.orientation.score_alpha && self.orientation.score_alpha <= 1.0) {
            return Err(Error::ConfigError(
                "Orientation score alpha must be in (0, 1]".to_string(),
            ));
        }
        if self.orientation.transition_rate <= 0.0 {
            return Err(Error::ConfigError(
                "Orientation transition rate must be positive".to_string(),
            ));
        }

        if self.anchor.dead_zone < 0.0 || self.anchor.dead_zone_band < 0.0 {
            return Err(Error::ConfigError(
                "Anchor dead zone and band must be non-negative".to_string(),
            ));
        }
        for (name, curve) in [
            ("screen", &self.anchor.screen_attenuation),
            ("world", &self.anchor.world_attenuation),
        ] {
            if !(0.0 < curve.floor && curve.floor <= 1.0) {
                return Err(Error::ConfigError(format!(
                    "Anchor {name} attenuation floor must be in (0, 1]"
                )));
            }
            if curve.full_scale <= 0.0 || curve.gamma <= 0.0 {
                return Err(Error::ConfigError(format!(
                    "Anchor {name} attenuation full scale and gamma must be positive"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.anchor.micro_follow_slow)
            || !(0.0..=1.0).contains(&self.anchor.micro_follow_fast)
        {
            return Err(Error::ConfigError(
                "Micro-follow rates must be between 0.0 and 1.0".to_string(),
            ));
        }

        if self.transform.scale_min <= 0.0 || self.transform.scale_min >= self.transform.scale_max {
            return Err(Error::ConfigError(
                "Scale clamp must satisfy 0 < min < max".to_string(),
            ));
        }
        if self.transform.finger_diameter_ratio <= 0.0 {
            return Err(Error::ConfigError(
                "Finger diameter ratio must be positive".to_string(),
            ));
        }

        if !(0.0 < self.camera.fov_y_degrees && self.camera.fov_y_degrees < 180.0) {
            return Err(Error::ConfigError(
                "Field of view must be in (0, 180) degrees".to_string(),
            ));
        }
        if self.camera.video_aspect <= 0.0 || self.camera.container_aspect <= 0.0 {
            return Err(Error::ConfigError(
                "Aspect ratios must be positive".to_string(),
            ));
        }

        if self.asset.default_ratio <= 0.0 {
            return Err(Error::ConfigError(
                "Default calibration ratio must be positive".to_string(),
            ));
        }
        if let Some((id, ratio)) = self
            .asset
            .calibrations
            .iter()
            .find(|(_, r)| **r <= 0.0)
        {
            return Err(Error::ConfigError(format!(
                "Calibration ratio for asset '{id}' must be positive, got {ratio}"
            )));
        }

        if self.input_age_s < 0.0 {
            return Err(Error::ConfigError(
                "Input age must be non-negative".to_string(),
            ));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Ring pose pipeline configuration

# Landmark stabilization
stabilization:
  preset: "balanced"        # responsive | balanced | smooth | steady
  overrides: {}             # e.g. { dead_zone: 0.003, beta: 0.4 }

# Shared latency/smoothness trade-off
smoothing:
  responsiveness: 12.0
  base_strength: 0.25
  slider: 0.5               # user-facing: 0 = snappy, 1 = buttery

# Palm/back classification
orientation:
  hysteresis: 0.6
  debounce_ms: 500.0
  score_alpha: 0.35
  depth_gain: 8.0
  transition_rate: 8.0

# Anchor resolution
anchor:
  bias: 0.35
  along_offset: 0.0
  stabilized_blend: 0.5
  stabilized_velocity_cutoff: 0.5
  dead_zone: 0.0025
  dead_zone_band: 0.003
  dead_zone_ease: 0.12
  micro_threshold: 0.004
  micro_follow_slow: 0.35
  micro_follow_fast: 0.95
  screen_attenuation: { floor: 0.15, full_scale: 0.06, gamma: 0.5 }
  world_attenuation: { floor: 0.15, full_scale: 1.2, gamma: 0.5 }
  depth_base: 0.45
  depth_scale: 0.5
  lookahead_s: 0.03

# Object transform composition
transform:
  finger_diameter_ratio: 0.72
  fit_adjust: 0.12
  closure_scale_boost: 0.25
  closure_pullback: 0.035
  scale_min: 0.002
  scale_max: 0.25
  base_offset: [0.0, 0.0, 0.0]
  hug_offset_gain: 0.6
  tilt_gain: 0.5
  max_tilt: 0.5
  z_rotation_smoothing: 0.5
  idle_spin_rate: 0.9
  idle_scale: 0.05

# Camera and viewport
camera:
  fov_y_degrees: 60.0
  video_aspect: 1.7777778
  container_aspect: 1.7777778

# Ring asset calibration
asset:
  active: "classic-band"
  calibrations:
    classic-band: 1.0
    slim-band: 0.82
  default_ratio: 1.0

# Assumed capture-to-process latency (seconds)
input_age_s: 0.0
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_example_config_parses_and_validates() {
        let config: Config = serde_yaml::from_str(EXAMPLE_CONFIG).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.asset.active.as_deref(), Some("classic-band"));
        assert!((config.asset.calibrations["slim-band"] - 0.82).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_preset_rejected() {
        let mut config = Config::default();
        config.stabilization.preset = "cinematic".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_slider_rejected() {
        let mut config = Config::default();
        config.smoothing.slider = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_scale_clamp_rejected() {
        let mut config = Config::default();
        config.transform.scale_min = config.transform.scale_max;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_calibration_rejected() {
        let mut config = Config::default();
        config.asset.calibrations.insert("broken".to_string(), -1.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert!(parsed.validate().is_ok());
        assert_eq!(parsed.stabilization.preset, config.stabilization.preset);
    }
}
