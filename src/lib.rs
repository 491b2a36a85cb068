//! Hand-landmark stabilization and ring-placement pose pipeline.
//!
//! This library is the signal-processing core of a virtual ring try-on:
//! it turns noisy 21-point hand landmarks from a detection model into a
//! stable, physically plausible placement (position, scale, rotation,
//! orientation-dependent visibility) for a virtual ring, frame over frame,
//! at interactive rates.
//!
//! The per-frame data flow:
//! 1. [`filters::LandmarkSetStabilizer`] smooths the raw landmark set with
//!    per-point adaptive filters, dead-zone suppression, and predictive
//!    extrapolation under a named quality/latency preset
//! 2. [`orientation::OrientationClassifier`] derives a continuous palmness
//!    score and a hysteretic palm/back label from the raw geometry
//! 3. [`anchor::PoseAnchorResolver`] computes a maximally-stable anchor
//!    point from two ring-finger joints with motion-adaptive smoothing
//! 4. [`transform::TransformComposer`] converts anchor, finger diameter,
//!    depth, and orientation into the final object transform
//!
//! Rendering, asset loading, UI, and the hand-detection model itself are
//! external collaborators; this crate only consumes detector output and
//! produces transforms.
//!
//! # Examples
//!
//! ```
//! use ring_pose::config::Config;
//! use ring_pose::landmarks::{HandFrame, Handedness, Landmark};
//! use ring_pose::pipeline::RingPipeline;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut pipeline = RingPipeline::new(&Config::default())?;
//!
//! // A frame without a hand: the object falls back to an idle spin
//! let idle = pipeline.process(&HandFrame::empty(0.0))?;
//! assert!(!idle.tracking);
//!
//! // A detector frame with all 21 landmarks drives the placement
//! let landmarks: Vec<Landmark> = (0..21)
//!     .map(|i| Landmark::new(0.3 + 0.015 * f64::from(i), 0.5, -0.05))
//!     .collect();
//! let frame = HandFrame::tracked(landmarks, Handedness::Right, 16.7);
//! let output = pipeline.process(&frame)?;
//! assert!(output.tracking);
//! println!("scale: {:.4}", output.transform.scale);
//! # Ok(())
//! # }
//! ```

/// Hand landmark types and anatomical indexing
pub mod landmarks;

/// Landmark stabilization filter bank
pub mod filters;

/// Palm/back orientation classification
pub mod orientation;

/// Hand-closure (fist-curl) estimation
pub mod closure;

/// Anchor resolution from two finger joints
pub mod anchor;

/// Final object transform composition
pub mod transform;

/// Per-frame pipeline orchestration
pub mod pipeline;

/// Pinhole camera model and viewport mapping
pub mod camera;

/// Configuration management
pub mod config;

/// Error types and result handling
pub mod error;

/// Constants used throughout the pipeline
pub mod constants;

pub use error::{Error, Result};
