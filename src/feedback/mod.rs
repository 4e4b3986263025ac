//! Impact feedback independent of the selection lifecycle.

pub mod spring;
pub mod strike;

pub use spring::{SpringConfig, SpringState, SquashStretch};
pub use strike::{Strike, StrikeConfig, StrikeDetector, StrikeSource};
