//! Giftcard Gestures - hand/face gestures driving select, hold and dissolve
//! interaction lifecycles for gift-card scenes

pub mod core;
pub mod feedback;
pub mod gesture;
pub mod interaction;
pub mod landmarks;
pub mod scene;
pub mod transition;
