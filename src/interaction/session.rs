//! Per-scene interaction timing and the ambient motion of idle targets.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::core::types::{Pose, Seconds, TargetId};

/// Timing and presentation for the select/hold/dissolve lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Minimum time a lock is held before a release is honoured (seconds).
    ///
    /// A release that arrives earlier is ignored, so even a very short grab
    /// keeps the item on screen long enough to be seen.
    pub min_display_duration: f64,
    /// Time after a dissolve finishes before the next grab may select.
    pub cooldown_duration: f64,
    /// How long a grab must be held before the candidate locks. Zero locks on
    /// the same tick the grab starts.
    pub candidate_confirm_duration: f64,
    /// Ambient rotation per tick while idle (radians).
    pub ambient_base_step: f32,
    /// Extra ambient rotation per unit of horizontal hand velocity.
    pub ambient_speed_gain: f32,
    /// Where a locked target is presented, in front of the viewer.
    pub focus_distance: f32,
    pub focus_height: f32,
    pub focus_scale: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            min_display_duration: 1.5,
            cooldown_duration: 0.8,
            candidate_confirm_duration: 0.0,
            ambient_base_step: 0.002,
            ambient_speed_gain: 0.0005,
            focus_distance: 8.0,
            focus_height: 6.0,
            focus_scale: 3.5,
        }
    }
}

impl InteractionConfig {
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("min_display_duration", self.min_display_duration),
            ("cooldown_duration", self.cooldown_duration),
            ("candidate_confirm_duration", self.candidate_confirm_duration),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(format!("{name} ({value}) must be a non-negative duration"));
            }
        }
        if self.focus_scale <= 0.0 {
            return Err(format!("focus_scale ({}) must be positive", self.focus_scale));
        }
        Ok(())
    }
}

/// Session-wide state. The highlighted slot is the only mutually exclusive
/// resource in the system and only the controller writes it.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionSession {
    pub highlighted: Option<TargetId>,
    pub cooldown_end_time: Seconds,
    pub min_display_duration: Seconds,
    pub cooldown_duration: Seconds,
}

impl InteractionSession {
    pub fn new(config: &InteractionConfig) -> Self {
        Self {
            highlighted: None,
            cooldown_end_time: 0.0,
            min_display_duration: config.min_display_duration,
            cooldown_duration: config.cooldown_duration,
        }
    }

    pub fn in_cooldown(&self, now: Seconds) -> bool {
        now < self.cooldown_end_time
    }
}

/// Rotation of the whole target group about +Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientMotion {
    pub angle: f32,
    base_step: f32,
    speed_gain: f32,
}

impl AmbientMotion {
    pub fn new(config: &InteractionConfig) -> Self {
        Self {
            angle: 0.0,
            base_step: config.ambient_base_step,
            speed_gain: config.ambient_speed_gain,
        }
    }

    pub fn advance(&mut self, horizontal_velocity: f32) {
        let push = if horizontal_velocity.is_finite() {
            horizontal_velocity * self.speed_gain
        } else {
            0.0
        };
        self.angle = (self.angle + self.base_step + push).rem_euclid(std::f32::consts::TAU);
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.angle)
    }

    /// Depth toward the viewer (+z) of a group-local position.
    pub fn depth_of(&self, local: Vec3) -> f32 {
        (self.rotation() * local).z
    }

    /// Group-local pose that appears centred in front of the viewer.
    pub fn focus_pose(&self, config: &InteractionConfig) -> Pose {
        let inverse = Quat::from_rotation_y(-self.angle);
        Pose {
            position: inverse * Vec3::new(0.0, config.focus_height, config.focus_distance),
            orientation: inverse,
            scale: Vec3::splat(config.focus_scale),
        }
    }
}
