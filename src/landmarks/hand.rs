//! Hand landmark layout and per-frame landmark sets.
//!
//! Positions are normalized image coordinates: x and y in [0,1] in the common
//! case, z relative depth with no fixed range.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Number of keypoints in one hand landmark set.
pub const HAND_LANDMARK_COUNT: usize = 21;

/// The 21 hand keypoints in detector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandJoint {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

impl HandJoint {
    /// Array index (0-20).
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Tips of the four non-thumb fingers, paired with their knuckles.
    pub fn finger_tips_and_knuckles() -> [(HandJoint, HandJoint); 4] {
        [
            (Self::IndexTip, Self::IndexMcp),
            (Self::MiddleTip, Self::MiddleMcp),
            (Self::RingTip, Self::RingMcp),
            (Self::PinkyTip, Self::PinkyMcp),
        ]
    }
}

/// One normalized keypoint as delivered by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<Vec3> for Landmark {
    fn from(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// One tracked hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandLandmarks {
    pub points: Vec<Landmark>,
}

impl HandLandmarks {
    pub fn new(points: Vec<Landmark>) -> Self {
        Self { points }
    }

    /// A set is usable only with the full keypoint count and finite coordinates.
    pub fn is_well_formed(&self) -> bool {
        self.points.len() == HAND_LANDMARK_COUNT && self.points.iter().all(Landmark::is_finite)
    }

    /// Position of a joint, `None` when the set is too short to hold it.
    pub fn joint(&self, joint: HandJoint) -> Option<Vec3> {
        self.points.get(joint.index()).map(|p| p.to_vec3())
    }

    /// Planar (image-space) distance between two joints.
    pub fn planar_distance(&self, a: HandJoint, b: HandJoint) -> Option<f32> {
        let a = self.points.get(a.index())?.to_vec2();
        let b = self.points.get(b.index())?.to_vec2();
        Some(a.distance(b))
    }

    pub fn set_joint(&mut self, joint: HandJoint, position: Vec3) {
        if let Some(p) = self.points.get_mut(joint.index()) {
            *p = position.into();
        }
    }
}

/// Face blendshape scores, keyed by category name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceBlendshapes {
    pub scores: Vec<(String, f32)>,
}

impl FaceBlendshapes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_score(mut self, name: &str, score: f32) -> Self {
        self.scores.push((name.to_string(), score));
        self
    }

    /// Score for a category, 0 when absent or non-finite.
    pub fn score(&self, name: &str) -> f32 {
        self.scores
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| *s)
            .filter(|s| s.is_finite())
            .unwrap_or(0.0)
    }
}

/// Everything the detector reported for one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    #[serde(default)]
    pub hands: Vec<HandLandmarks>,
    #[serde(default)]
    pub face: Option<FaceBlendshapes>,
}

impl LandmarkFrame {
    /// Frame with nothing tracked.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_hands(hands: Vec<HandLandmarks>) -> Self {
        Self { hands, face: None }
    }

    pub fn with_face(face: FaceBlendshapes) -> Self {
        Self {
            hands: Vec::new(),
            face: Some(face),
        }
    }

    /// Primary hand if it is usable. A malformed primary hand counts as absent.
    pub fn primary_hand(&self) -> Option<&HandLandmarks> {
        self.hands.first().filter(|h| h.is_well_formed())
    }

    /// Both hands when exactly two well-formed sets are present.
    pub fn hand_pair(&self) -> Option<(&HandLandmarks, &HandLandmarks)> {
        match self.hands.as_slice() {
            [a, b] if a.is_well_formed() && b.is_well_formed() => Some((a, b)),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hands.is_empty() && self.face.is_none()
    }
}
