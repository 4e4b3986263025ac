//! Gesture classification: landmarks in, smoothed signals and debounced
//! predicates out.

pub mod classifier;
pub mod hysteresis;
pub mod signals;
pub mod smoothing;

pub use classifier::{GestureClassifier, GestureConfig, GestureKind, GestureSample};
pub use hysteresis::{GateThresholds, HysteresisGate, Polarity};
pub use smoothing::{Ema, VelocityConfig, VelocityTracker};
