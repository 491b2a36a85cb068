//! End-to-end pipeline scenarios

mod test_helpers;

use ring_pose::config::Config;
use ring_pose::landmarks::{Handedness, HandFrame, Landmark, RING_MCP, RING_PIP};
use ring_pose::pipeline::RingPipeline;
use test_helpers::{frame_at, open_hand, translated, FRAME_MS};

#[test]
fn test_static_hand_settles_by_frame_two() {
    // Scenario: identical landmarks for 30 frames at 60 Hz. Scale and
    // position must settle; frame 30 differs from frame 2 by under 0.1%.
    let mut pipeline = RingPipeline::new(&Config::default()).unwrap();
    let hand = open_hand(0.5, 0.5, -0.05);

    let mut frame2 = None;
    let mut last = None;
    for i in 0..30 {
        let out = pipeline.process(&frame_at(&hand, i)).unwrap();
        if i == 1 {
            frame2 = Some(out);
        }
        last = Some(out);
    }
    let frame2 = frame2.unwrap();
    let last = last.unwrap();

    let scale_drift = (last.transform.scale - frame2.transform.scale).abs() / frame2.transform.scale;
    assert!(scale_drift < 0.001, "scale drifted {scale_drift}");

    let position_drift = (last.transform.position - frame2.transform.position).norm();
    let reference = frame2.transform.position.norm().max(1e-6);
    assert!(
        position_drift / reference < 0.001,
        "position drifted {position_drift}"
    );
}

#[test]
fn test_fast_gesture_relaxes_smoothing() {
    // Scenario: the two anchor joints jump 0.05 normalized units between
    // consecutive frames. The motion attenuation must drop below 0.7 and
    // the anchor must cover at least 60% of the jump within that frame.
    let mut pipeline = RingPipeline::new(&Config::default()).unwrap();
    let hand = open_hand(0.5, 0.5, -0.05);
    let mut before = None;
    for i in 0..30 {
        before = Some(pipeline.process(&frame_at(&hand, i)).unwrap());
    }
    let before_anchor = before.unwrap().anchor.unwrap();

    let mut jumped = hand.clone();
    jumped[RING_MCP] = Landmark::new(hand[RING_MCP].x + 0.05, hand[RING_MCP].y, hand[RING_MCP].z);
    jumped[RING_PIP] = Landmark::new(hand[RING_PIP].x + 0.05, hand[RING_PIP].y, hand[RING_PIP].z);

    let out = pipeline.process(&frame_at(&jumped, 30)).unwrap();
    assert!(out.attenuation < 0.7, "attenuation {}", out.attenuation);

    let after_anchor = out.anchor.unwrap();
    let moved = (after_anchor - before_anchor).norm();
    assert!(
        moved >= 0.6 * 0.05,
        "anchor moved {moved}, expected at least 60% of the 0.05 jump"
    );
}

#[test]
fn test_hand_loss_resets_to_fresh_state() {
    // After a no-hand frame, the next valid frame must produce exactly
    // what a freshly constructed pipeline produces: no memory of the
    // pre-occlusion trajectory.
    let config = Config::default();
    let mut used = RingPipeline::new(&config).unwrap();
    let mut fresh = RingPipeline::new(&config).unwrap();

    let hand = open_hand(0.4, 0.55, -0.05);
    for i in 0..20 {
        let drifting = translated(&hand, 0.003 * i as f64, -0.002 * i as f64, 0.0);
        used.process(&frame_at(&drifting, i)).unwrap();
    }

    let lost = used.process(&HandFrame::empty(20.0 * FRAME_MS)).unwrap();
    assert!(!lost.tracking);
    assert!(!used.is_tracking());

    let reacquired = open_hand(0.62, 0.38, -0.12);
    let t = 45.0 * FRAME_MS;
    let frame = HandFrame::tracked(reacquired.clone(), Handedness::Right, t);
    let a = used.process(&frame).unwrap();
    let b = fresh.process(&frame).unwrap();

    assert!((a.transform.position - b.transform.position).norm() < 1e-9);
    assert!((a.transform.scale - b.transform.scale).abs() < 1e-9);
    assert!((a.transform.rotation - b.transform.rotation).norm() < 1e-9);
    assert!((a.orientation.score - b.orientation.score).abs() < 1e-12);
    assert!((a.attenuation - b.attenuation).abs() < 1e-12);
}

#[test]
fn test_malformed_frame_is_loud_and_recoverable() {
    let mut pipeline = RingPipeline::new(&Config::default()).unwrap();
    let hand = open_hand(0.5, 0.5, -0.05);
    pipeline.process(&frame_at(&hand, 0)).unwrap();

    let mut short = hand.clone();
    short.pop();
    let bad = HandFrame::tracked(short, Handedness::Right, FRAME_MS);
    assert!(pipeline.process(&bad).is_err());

    // The pipeline keeps working after the error
    let out = pipeline.process(&frame_at(&hand, 2)).unwrap();
    assert!(out.tracking);
}

#[test]
fn test_left_hand_reads_opposite_orientation() {
    let config = Config::default();
    let mut right = RingPipeline::new(&config).unwrap();
    let mut left = RingPipeline::new(&config).unwrap();
    let hand = open_hand(0.5, 0.5, -0.05);

    let mut right_out = None;
    let mut left_out = None;
    for i in 0..10 {
        let t = i as f64 * FRAME_MS;
        right_out = Some(
            right
                .process(&HandFrame::tracked(hand.clone(), Handedness::Right, t))
                .unwrap(),
        );
        left_out = Some(
            left.process(&HandFrame::tracked(hand.clone(), Handedness::Left, t))
                .unwrap(),
        );
    }
    // Mirrored-camera geometry: the same landmarks read as opposite
    // orientations for opposite hands
    let r = right_out.unwrap().orientation.score;
    let l = left_out.unwrap().orientation.score;
    assert!((r + l).abs() < 1e-9);
}

#[test]
fn test_recording_frame_round_trip() {
    // The replay tool consumes one JSON frame per line; the frame type
    // must survive the round trip exactly
    let frame = frame_at(&open_hand(0.5, 0.5, -0.05), 3);
    let json = serde_json::to_string(&frame).unwrap();
    let parsed: HandFrame = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.landmarks, frame.landmarks);
    assert_eq!(parsed.handedness, frame.handedness);
    assert!((parsed.timestamp_ms - frame.timestamp_ms).abs() < 1e-12);

    let empty = HandFrame::empty(123.0);
    let json = serde_json::to_string(&empty).unwrap();
    let parsed: HandFrame = serde_json::from_str(&json).unwrap();
    assert!(parsed.landmarks.is_none());
}
