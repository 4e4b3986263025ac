//! Synthetic landmark poses for scripted sessions, tests and benches.

use glam::{Vec2, Vec3};

use super::hand::{FaceBlendshapes, HandJoint, HandLandmarks, Landmark, LandmarkFrame, HAND_LANDMARK_COUNT};

/// Poses a scripted session can present to the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptedPose {
    /// Nothing tracked.
    Absent,
    /// One hand, fingers spread.
    Open,
    /// One hand, fingers curled into a fist.
    Fist,
    /// One hand, thumb tip touching index tip.
    Pinch,
    /// Two hands pressed together.
    Prayer,
    /// Two hands touching at thumb and index tips, wrists apart.
    Heart,
    /// Face only, lips puckered.
    Blow,
}

// Knuckle offsets from the wrist, image space (y grows downward).
const INDEX_MCP: Vec2 = Vec2::new(-0.03, -0.10);
const MIDDLE_MCP: Vec2 = Vec2::new(0.0, -0.105);
const RING_MCP: Vec2 = Vec2::new(0.03, -0.10);
const PINKY_MCP: Vec2 = Vec2::new(0.055, -0.09);

const EXTENDED: f32 = 1.9;
const CURLED: f32 = 0.8;

/// Build a single hand around `wrist` with every finger tip at `extension`
/// times its knuckle distance from the wrist.
fn hand_with_extension(wrist: Vec2, extension: f32, thumb_tip: Vec2) -> HandLandmarks {
    let mut hand = HandLandmarks::new(vec![Landmark::default(); HAND_LANDMARK_COUNT]);
    let at = |offset: Vec2| (wrist + offset).extend(0.0);

    hand.set_joint(HandJoint::Wrist, at(Vec2::ZERO));
    hand.set_joint(HandJoint::ThumbCmc, at(Vec2::new(-0.03, -0.02)));
    hand.set_joint(HandJoint::ThumbMcp, at(Vec2::new(-0.05, -0.035)));
    hand.set_joint(HandJoint::ThumbIp, at((Vec2::new(-0.05, -0.035) + thumb_tip) * 0.5));
    hand.set_joint(HandJoint::ThumbTip, at(thumb_tip));

    let fingers = [
        (INDEX_MCP, [HandJoint::IndexMcp, HandJoint::IndexPip, HandJoint::IndexDip, HandJoint::IndexTip]),
        (MIDDLE_MCP, [HandJoint::MiddleMcp, HandJoint::MiddlePip, HandJoint::MiddleDip, HandJoint::MiddleTip]),
        (RING_MCP, [HandJoint::RingMcp, HandJoint::RingPip, HandJoint::RingDip, HandJoint::RingTip]),
        (PINKY_MCP, [HandJoint::PinkyMcp, HandJoint::PinkyPip, HandJoint::PinkyDip, HandJoint::PinkyTip]),
    ];
    for (mcp, joints) in fingers {
        let tip = mcp * extension;
        hand.set_joint(joints[0], at(mcp));
        hand.set_joint(joints[1], at(mcp.lerp(tip, 0.4)));
        hand.set_joint(joints[2], at(mcp.lerp(tip, 0.7)));
        hand.set_joint(joints[3], at(tip));
    }
    hand
}

/// Open hand: fold ratio 1.9, wide thumb, five fingers up.
pub fn open_hand(wrist: Vec2) -> HandLandmarks {
    hand_with_extension(wrist, EXTENDED, Vec2::new(-0.14, -0.05))
}

/// Fist: fold ratio 0.8, thumb tucked away from the index tip.
pub fn fist(wrist: Vec2) -> HandLandmarks {
    hand_with_extension(wrist, CURLED, Vec2::new(0.02, -0.04))
}

/// Open hand with the thumb tip resting on the index tip.
pub fn pinch(wrist: Vec2) -> HandLandmarks {
    let index_tip = INDEX_MCP * EXTENDED;
    hand_with_extension(wrist, EXTENDED, index_tip + Vec2::new(0.005, 0.0))
}

/// Hand whose fold ratio is exactly `ratio` (index tip straight above the
/// index knuckle line, middle finger extended so it never wins the min).
pub fn hand_with_fold_ratio(wrist: Vec2, ratio: f32) -> HandLandmarks {
    let mut hand = open_hand(wrist);
    let index_tip = wrist + INDEX_MCP * ratio;
    hand.set_joint(HandJoint::IndexTip, index_tip.extend(0.0));
    let middle_tip = wrist + MIDDLE_MCP * (ratio.max(1.0) * 3.0);
    hand.set_joint(HandJoint::MiddleTip, middle_tip.extend(0.0));
    hand
}

/// Frame for a scripted pose with the (primary) wrist at `wrist`.
pub fn frame_for(pose: ScriptedPose, wrist: Vec2) -> LandmarkFrame {
    match pose {
        ScriptedPose::Absent => LandmarkFrame::empty(),
        ScriptedPose::Open => LandmarkFrame::with_hands(vec![open_hand(wrist)]),
        ScriptedPose::Fist => LandmarkFrame::with_hands(vec![fist(wrist)]),
        ScriptedPose::Pinch => LandmarkFrame::with_hands(vec![pinch(wrist)]),
        ScriptedPose::Prayer => {
            let a = open_hand(wrist);
            let b = open_hand(wrist + Vec2::new(0.05, 0.0));
            LandmarkFrame::with_hands(vec![a, b])
        }
        ScriptedPose::Heart => {
            let a = open_hand(wrist);
            let mut b = open_hand(wrist + Vec2::new(0.3, 0.0));
            let nudge = Vec3::new(0.02, 0.0, 0.0);
            for joint in [HandJoint::ThumbTip, HandJoint::IndexTip] {
                if let Some(p) = a.joint(joint) {
                    b.set_joint(joint, p + nudge);
                }
            }
            LandmarkFrame::with_hands(vec![a, b])
        }
        ScriptedPose::Blow => LandmarkFrame::with_face(
            FaceBlendshapes::new()
                .with_score("mouthPucker", 0.8)
                .with_score("mouthFunnel", 0.2),
        ),
    }
}
