//! Helper functions and synthetic hand generators for tests
#![allow(dead_code)]

use ring_pose::landmarks::{Handedness, HandFrame, Landmark, FINGER_CHAINS, THUMB_CMC, WRIST};

/// Frame interval for a 60 Hz synthetic stream, in milliseconds
pub const FRAME_MS: f64 = 1000.0 / 60.0;

/// A plausible open right hand centered near `(cx, cy)`, palm toward the
/// camera, fingers pointing up-screen. Depth layout matches the detector
/// convention (bases closer to the camera than the wrist, tips farther
/// than the bases).
pub fn open_hand(cx: f64, cy: f64, z: f64) -> Vec<Landmark> {
    let mut hand = vec![Landmark::default(); 21];
    hand[WRIST] = Landmark::new(cx, cy + 0.18, z);

    // Thumb fans out diagonally from the wrist
    for j in 0..4 {
        let t = (j + 1) as f64;
        hand[THUMB_CMC + j] = Landmark::new(cx - 0.03 - 0.025 * t, cy + 0.16 - 0.03 * t, z - 0.01);
    }

    // Non-thumb fingers: bases in a row, three joints stacked above each
    for (f, chain) in FINGER_CHAINS.iter().enumerate() {
        let x = cx - 0.06 + 0.04 * f as f64;
        for (j, &idx) in chain.iter().enumerate() {
            hand[idx] = Landmark::new(x, cy + 0.02 - 0.045 * j as f64, z - 0.1 + 0.04 * j as f64);
        }
    }
    hand
}

/// The same hand flipped to show the back: finger order mirrors on screen
/// and the depth layout inverts (bases farther than the wrist, tips closer
/// than the bases).
pub fn back_hand(cx: f64, cy: f64, z: f64) -> Vec<Landmark> {
    let mut hand = open_hand(cx, cy, z);
    for (f, chain) in FINGER_CHAINS.iter().enumerate() {
        let x = cx + 0.06 - 0.04 * f as f64;
        for (j, &idx) in chain.iter().enumerate() {
            hand[idx] = Landmark::new(x, cy + 0.02 - 0.045 * j as f64, z + 0.1 - 0.04 * j as f64);
        }
    }
    hand
}

/// Translate every landmark of a hand by the same offset
pub fn translated(hand: &[Landmark], dx: f64, dy: f64, dz: f64) -> Vec<Landmark> {
    hand.iter()
        .map(|p| Landmark::new(p.x + dx, p.y + dy, p.z + dz))
        .collect()
}

/// Deterministic sub-dead-zone jitter around a base hand. The displacement
/// per frame stays strictly below `amplitude`.
pub fn jittered(hand: &[Landmark], frame: usize, amplitude: f64) -> Vec<Landmark> {
    let phase = frame as f64 * 2.399; // golden-angle stepping, no resonance
    let dx = amplitude * 0.7 * phase.sin();
    let dy = amplitude * 0.7 * phase.cos();
    translated(hand, dx, dy, 0.0)
}

/// A tracked frame at the given 60 Hz frame index
pub fn frame_at(hand: &[Landmark], frame: usize) -> HandFrame {
    HandFrame::tracked(hand.to_vec(), Handedness::Right, frame as f64 * FRAME_MS)
}
