//! Hand-closure (fist-curl) estimation.
//!
//! For each non-thumb finger the straight-line base-to-tip distance is
//! compared against the summed segment lengths along the joint chain. A
//! straight finger has a ratio near 1, a curled finger much less; one minus
//! the ratio approximates curl. The average across the four fingers is the
//! closure estimate. The signal is only meaningful when the back of the
//! hand faces the camera, the consumer gates on orientation.

use crate::constants::GEOMETRY_EPSILON;
use crate::landmarks::{Landmark, FINGER_CHAINS};

/// Continuous closure estimate in [0,1]; 0 = open hand, 1 = tight fist.
///
/// Fingers whose chain length degenerates to zero are skipped; if every
/// finger degenerates the estimate is 0.
#[must_use]
pub fn hand_closure(landmarks: &[Landmark]) -> f64 {
    let mut total = 0.0;
    let mut counted = 0;

    for chain in &FINGER_CHAINS {
        let base = landmarks[chain[0]];
        let tip = landmarks[chain[3]];

        let mut chain_length = 0.0;
        for pair in chain.windows(2) {
            chain_length += landmarks[pair[0]].distance(&landmarks[pair[1]]);
        }
        if chain_length < GEOMETRY_EPSILON {
            continue;
        }

        let ratio = (base.distance(&tip) / chain_length).clamp(0.0, 1.0);
        total += 1.0 - ratio;
        counted += 1;
    }

    if counted == 0 {
        0.0
    } else {
        total / f64::from(counted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::NUM_HAND_LANDMARKS;
    use crate::landmarks::FINGER_CHAINS;

    fn straight_hand() -> Vec<Landmark> {
        let mut hand = vec![Landmark::default(); NUM_HAND_LANDMARKS];
        for (f, chain) in FINGER_CHAINS.iter().enumerate() {
            for (j, &idx) in chain.iter().enumerate() {
                // Straight vertical fingers: chord equals chain length
                hand[idx] = Landmark::new(0.3 + 0.1 * f as f64, 0.6 - 0.08 * j as f64, 0.0);
            }
        }
        hand
    }

    fn curled_hand() -> Vec<Landmark> {
        let mut hand = vec![Landmark::default(); NUM_HAND_LANDMARKS];
        for (f, chain) in FINGER_CHAINS.iter().enumerate() {
            let x = 0.3 + 0.1 * f as f64;
            // Tip folded back next to the base
            hand[chain[0]] = Landmark::new(x, 0.6, 0.0);
            hand[chain[1]] = Landmark::new(x, 0.52, 0.0);
            hand[chain[2]] = Landmark::new(x + 0.03, 0.56, 0.0);
            hand[chain[3]] = Landmark::new(x, 0.59, 0.0);
        }
        hand
    }

    #[test]
    fn test_straight_fingers_near_zero() {
        let closure = hand_closure(&straight_hand());
        assert!(closure < 0.01, "closure was {closure}");
    }

    #[test]
    fn test_fist_scores_high() {
        let closure = hand_closure(&curled_hand());
        assert!(closure > 0.5, "closure was {closure}");
    }

    #[test]
    fn test_degenerate_chain_skipped() {
        // Coincident joints everywhere: no finger contributes
        let hand = vec![Landmark::new(0.5, 0.5, 0.0); NUM_HAND_LANDMARKS];
        assert_eq!(hand_closure(&hand), 0.0);
    }
}
