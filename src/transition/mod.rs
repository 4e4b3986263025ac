//! Procedural dissolve/reassemble transitions.

pub mod easing;
pub mod engine;
pub mod job;

pub use easing::Easing;
pub use engine::{StepMode, TransitionCompletion, TransitionConfig, TransitionEngine};
pub use job::{Choreography, CloudShape, Particle, TransitionJob};
