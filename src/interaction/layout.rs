//! Rest placement of the target pool.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::core::types::{Pose, TargetId};

use super::target::InteractionTarget;

/// Targets wound up a cone, each facing outward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpiralLayout {
    pub count: u32,
    pub height: f32,
    pub base_radius: f32,
    /// Radius left at the apex.
    pub apex_radius: f32,
    /// Angle between consecutive targets (radians).
    pub angle_step: f32,
}

impl Default for SpiralLayout {
    fn default() -> Self {
        Self {
            count: 42,
            height: 17.0,
            base_radius: 9.0,
            apex_radius: 0.5,
            angle_step: 0.6,
        }
    }
}

impl SpiralLayout {
    pub fn rest_pose(&self, i: u32) -> Pose {
        let t = i as f32 / self.count.max(1) as f32;
        let y = t * (self.height - 1.0) + 0.5;
        let radius = self.base_radius * (1.0 - t) + self.apex_radius;
        let angle = i as f32 * self.angle_step;
        let (sin, cos) = angle.sin_cos();
        Pose::new(
            Vec3::new(cos * radius, y, sin * radius),
            Quat::from_rotation_y(cos.atan2(sin)),
        )
    }

    pub fn build_targets(&self) -> Vec<InteractionTarget> {
        (0..self.count)
            .map(|i| InteractionTarget::new(TargetId(i), self.rest_pose(i)))
            .collect()
    }
}
