//! Landmark input: hand/face keypoints delivered once per tick by an
//! external detector.

pub mod hand;
pub mod source;
pub mod synthetic;

pub use hand::{FaceBlendshapes, HandJoint, HandLandmarks, Landmark, LandmarkFrame, HAND_LANDMARK_COUNT};
pub use source::{LandmarkSource, RecordedSource, ScriptStep, ScriptedSource};
pub use synthetic::{frame_for, ScriptedPose};
