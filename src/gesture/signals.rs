//! Scalar signals derived from one hand (or a pair of hands).
//!
//! Single-hand ratios use planar distances so they stay stable when the
//! detector's relative depth is noisy; two-hand contact tests use full 3-D
//! distances. Every ratio returns `None` when its reference length is
//! degenerate or the hand lacks a joint, which the classifier treats as
//! "no hand".

use crate::landmarks::{HandJoint, HandLandmarks};

/// Reference lengths shorter than this make a ratio meaningless.
const MIN_REFERENCE: f32 = 1e-4;

fn ratio(numerator: f32, denominator: f32) -> Option<f32> {
    if denominator < MIN_REFERENCE {
        None
    } else {
        Some(numerator / denominator)
    }
}

/// Palm size: wrist to index knuckle.
pub fn palm_size(hand: &HandLandmarks) -> Option<f32> {
    hand.planar_distance(HandJoint::Wrist, HandJoint::IndexMcp)
}

/// Thumb/index spread relative to hand size, clamped to [0,1].
pub fn openness_ratio(hand: &HandLandmarks, hand_scale: f32) -> Option<f32> {
    let hand_size = hand.planar_distance(HandJoint::Wrist, HandJoint::MiddleMcp)? * hand_scale;
    let pinch = hand.planar_distance(HandJoint::ThumbTip, HandJoint::IndexTip)?;
    ratio(pinch, hand_size).map(|r| r.clamp(0.0, 1.0))
}

/// Tip-to-wrist over knuckle-to-wrist for the more curled of index and
/// middle finger. Smaller means a tighter fist.
pub fn fold_ratio(hand: &HandLandmarks) -> Option<f32> {
    let index = hand.planar_distance(HandJoint::Wrist, HandJoint::IndexTip)?;
    let middle = hand.planar_distance(HandJoint::Wrist, HandJoint::MiddleTip)?;
    ratio(index.min(middle), palm_size(hand)?)
}

/// Thumb-tip to index-tip over palm size.
pub fn pinch_ratio(hand: &HandLandmarks) -> Option<f32> {
    let pinch = hand.planar_distance(HandJoint::ThumbTip, HandJoint::IndexTip)?;
    ratio(pinch, palm_size(hand)?)
}

/// Thumb-tip to pinky-tip spread, normalized image units.
pub fn spread(hand: &HandLandmarks) -> Option<f32> {
    hand.planar_distance(HandJoint::ThumbTip, HandJoint::PinkyTip)
}

/// Number of extended fingers, 0-5.
pub fn finger_count(hand: &HandLandmarks, thumb_factor: f32, finger_factor: f32) -> Option<u8> {
    let palm = palm_size(hand)?;
    let mut count = 0;
    if hand.planar_distance(HandJoint::ThumbTip, HandJoint::PinkyMcp)? > palm * thumb_factor {
        count += 1;
    }
    for (tip, knuckle) in HandJoint::finger_tips_and_knuckles() {
        let tip_reach = hand.planar_distance(tip, HandJoint::Wrist)?;
        let knuckle_reach = hand.planar_distance(knuckle, HandJoint::Wrist)?;
        if tip_reach > knuckle_reach * finger_factor {
            count += 1;
        }
    }
    Some(count)
}

/// Largest 3-D gap between matching joints of two hands. Every pair lies
/// within a radius exactly when this gap is below it. `None` for an empty
/// joint list or when either hand lacks one of the joints.
pub fn max_joint_gap(a: &HandLandmarks, b: &HandLandmarks, joints: &[HandJoint]) -> Option<f32> {
    joints
        .iter()
        .map(|&j| Some(a.joint(j)?.distance(b.joint(j)?)))
        .collect::<Option<Vec<f32>>>()?
        .into_iter()
        .reduce(f32::max)
}

/// Palms pressed together: wrists and index tips meet.
pub const PRAYER_JOINTS: [HandJoint; 2] = [HandJoint::Wrist, HandJoint::IndexTip];

/// Heart shape: thumb tips and index tips meet.
pub const HEART_JOINTS: [HandJoint; 2] = [HandJoint::ThumbTip, HandJoint::IndexTip];
