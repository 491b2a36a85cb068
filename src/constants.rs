//! Constants used throughout the pipeline

/// Number of hand landmarks produced by the detector
pub const NUM_HAND_LANDMARKS: usize = 21;

/// Smallest frame interval treated as a real time step (seconds)
pub const DT_EPSILON: f64 = 1e-6;

/// Denominator guard for normalization and ratio computations
pub const GEOMETRY_EPSILON: f64 = 1e-9;

/// Rolling velocity history length for prediction (frames)
pub const VELOCITY_HISTORY_LEN: usize = 4;

/// Minimum average speed (units/s) before extrapolation is applied
pub const PREDICTION_VELOCITY_FLOOR: f64 = 1e-4;

/// Orientation score weights: palm normal, finger bases, fingertips
pub const ORIENTATION_NORMAL_WEIGHT: f64 = 0.5;
pub const ORIENTATION_BASES_WEIGHT: f64 = 0.3;
pub const ORIENTATION_TIPS_WEIGHT: f64 = 0.2;

/// Gain applied to the raw z-depth statistics before the tanh squash
pub const DEFAULT_DEPTH_GAIN: f64 = 8.0;

/// Hysteresis band for the discrete palm/back label
pub const DEFAULT_ORIENTATION_HYSTERESIS: f64 = 0.6;

/// Minimum dwell between accepted label flips (milliseconds)
pub const DEFAULT_ORIENTATION_DEBOUNCE_MS: f64 = 500.0;

/// EMA alpha for the continuous orientation score
pub const DEFAULT_SCORE_ALPHA: f64 = 0.35;

/// Exponential approach rate for the palm/back transition scalar (1/s)
pub const DEFAULT_TRANSITION_RATE: f64 = 8.0;

/// Shared smoothing law defaults
pub const DEFAULT_RESPONSIVENESS: f64 = 12.0;
pub const DEFAULT_BASE_STRENGTH: f64 = 0.25;
pub const DEFAULT_SMOOTHING_SLIDER: f64 = 0.5;

/// Motion attenuation curve defaults (screen space)
pub const DEFAULT_MOTION_FLOOR: f64 = 0.15;
pub const DEFAULT_MOTION_FULL_SCALE: f64 = 0.06;
pub const DEFAULT_MOTION_GAMMA: f64 = 0.5;

/// Full-scale world speed for the second attenuation source (m/s)
pub const DEFAULT_WORLD_FULL_SCALE: f64 = 1.2;

/// Depth estimate mapping from detector z to camera distance (meters)
pub const DEFAULT_DEPTH_BASE: f64 = 0.45;
pub const DEFAULT_DEPTH_SCALE: f64 = 0.5;
pub const MIN_CAMERA_DISTANCE: f64 = 0.15;
pub const MAX_CAMERA_DISTANCE: f64 = 1.5;

/// Ratio between the base-to-first-joint segment and the finger diameter
pub const DEFAULT_FINGER_DIAMETER_RATIO: f64 = 0.72;

/// Hard scale clamp for the composed object transform
pub const DEFAULT_SCALE_MIN: f64 = 0.002;
pub const DEFAULT_SCALE_MAX: f64 = 0.25;

/// Calibration ratio used when an asset has no dedicated record
pub const DEFAULT_CALIBRATION_RATIO: f64 = 1.0;

/// Idle affordance spin rate (radians/s)
pub const DEFAULT_IDLE_SPIN_RATE: f64 = 0.9;
