//! Hand landmark types and anatomical indexing.
//!
//! The detector produces exactly 21 landmarks per hand in a fixed anatomical
//! order (wrist first, then four joints per finger). Downstream code indexes
//! into that order positionally, so the count is a hard precondition enforced
//! at the stabilizer boundary.

use serde::{Deserialize, Serialize};

use crate::constants::NUM_HAND_LANDMARKS;

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// Joint chains of the four non-thumb fingers, base to tip
pub const FINGER_CHAINS: [[usize; 4]; 4] = [
    [INDEX_MCP, INDEX_PIP, INDEX_DIP, INDEX_TIP],
    [MIDDLE_MCP, MIDDLE_PIP, MIDDLE_DIP, MIDDLE_TIP],
    [RING_MCP, RING_PIP, RING_DIP, RING_TIP],
    [PINKY_MCP, PINKY_PIP, PINKY_DIP, PINKY_TIP],
];

/// One tracked hand point: x,y normalized screen space in [0,1]
/// (mirrored-camera convention), z a relative depth where more negative
/// means closer to the camera.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Landmark {
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another landmark
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Screen-plane distance, ignoring depth
    #[must_use]
    pub fn distance_2d(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Which hand the detector classified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

/// One frame of detector output: the full landmark set (or none when no
/// hand is visible), the handedness label, and a monotonic capture
/// timestamp in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandFrame {
    pub landmarks: Option<Vec<Landmark>>,
    pub handedness: Option<Handedness>,
    pub timestamp_ms: f64,
}

impl HandFrame {
    /// A frame with a visible hand
    #[must_use]
    pub fn tracked(landmarks: Vec<Landmark>, handedness: Handedness, timestamp_ms: f64) -> Self {
        Self {
            landmarks: Some(landmarks),
            handedness: Some(handedness),
            timestamp_ms,
        }
    }

    /// A frame where the detector saw no hand
    #[must_use]
    pub fn empty(timestamp_ms: f64) -> Self {
        Self {
            landmarks: None,
            handedness: None,
            timestamp_ms,
        }
    }

    /// True when the frame carries a complete landmark set
    #[must_use]
    pub fn has_hand(&self) -> bool {
        self.landmarks
            .as_ref()
            .is_some_and(|l| l.len() == NUM_HAND_LANDMARKS)
    }
}
