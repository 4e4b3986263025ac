//! Damped 1-D spring driving squash/stretch on impact.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    pub stiffness: f32,
    pub damping: f32,
    /// Velocity set on a trigger. Negative compresses.
    pub impulse: f32,
    /// Lateral bulge per unit of compression, for a volume-preserving look.
    pub bulge: f32,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            stiffness: 120.0,
            damping: 8.0,
            impulse: -15.0,
            bulge: 0.5,
        }
    }
}

impl SpringConfig {
    /// Softer, longer wobble layered under the main impact spring.
    pub fn wobble() -> Self {
        Self {
            stiffness: 20.0,
            damping: 0.6,
            impulse: -8.0,
            bulge: 0.5,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.stiffness < 0.0 || self.damping < 0.0 {
            return Err(format!(
                "spring stiffness ({}) and damping ({}) must be non-negative",
                self.stiffness, self.damping
            ));
        }
        Ok(())
    }
}

/// Scale multipliers for a squash/stretch deformation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SquashStretch {
    /// Along the impact axis.
    pub vertical: f32,
    /// Across the impact axis.
    pub lateral: f32,
}

/// Displacement from rest plus velocity. Nothing else is stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringState {
    pub displacement: f32,
    pub velocity: f32,
    pub stiffness: f32,
    pub damping: f32,
    impulse: f32,
    bulge: f32,
}

impl SpringState {
    pub fn new(config: SpringConfig) -> Self {
        Self {
            displacement: 0.0,
            velocity: 0.0,
            stiffness: config.stiffness,
            damping: config.damping,
            impulse: config.impulse,
            bulge: config.bulge,
        }
    }

    /// Semi-implicit Euler step: velocity first, then displacement.
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let force = -self.stiffness * self.displacement - self.damping * self.velocity;
        self.velocity += force * dt;
        self.displacement += self.velocity * dt;
    }

    /// Impact: overwrite velocity with the configured impulse.
    pub fn trigger(&mut self) {
        self.velocity = self.impulse;
    }

    pub fn is_settled(&self, epsilon: f32) -> bool {
        self.displacement.abs() < epsilon && self.velocity.abs() < epsilon
    }

    pub fn squash_stretch(&self) -> SquashStretch {
        SquashStretch {
            vertical: 1.0 + self.displacement,
            lateral: 1.0 - self.displacement * self.bulge,
        }
    }
}
