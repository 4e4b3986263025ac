//! Easing curves over t in [0,1].

use std::f32::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    InSine,
    OutSine,
    InCubic,
    InOutCubic,
}

impl Easing {
    /// Apply the curve. Input is clamped, so every curve maps 0→0 and 1→1.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::InSine => 1.0 - (t * FRAC_PI_2).cos(),
            Easing::OutSine => (t * FRAC_PI_2).sin(),
            Easing::InCubic => t * t * t,
            Easing::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}
