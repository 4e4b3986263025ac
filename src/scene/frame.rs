//! Per-tick snapshot handed to the render layer.

use glam::Vec3;
use serde::Serialize;

use crate::core::types::{JobId, Pose, Seconds, TargetId, Tick};
use crate::feedback::SquashStretch;
use crate::gesture::GestureSample;
use crate::interaction::TargetView;
use crate::transition::TransitionJob;

use super::events::SceneEvent;

/// Particles of one running transition. `positions` are local to the
/// cloud, offsets from `pose.position`; `pose` places the cloud in the scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticleCloud {
    pub job: JobId,
    pub target: TargetId,
    pub progress: f32,
    pub scale: f32,
    pub pose: Pose,
    pub positions: Vec<Vec3>,
}

impl ParticleCloud {
    pub fn of(job: &TransitionJob) -> Self {
        Self {
            job: job.id,
            target: job.target,
            progress: job.progress(),
            scale: job.shape().scale,
            pose: job.current_pose(),
            positions: job.positions().to_vec(),
        }
    }

    /// Particle positions in the scene's frame.
    pub fn world_positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.positions.iter().map(move |p| *p + self.pose.position)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SceneFrame {
    pub tick: Tick,
    pub time: Seconds,
    pub sample: GestureSample,
    pub targets: Vec<TargetView>,
    pub clouds: Vec<ParticleCloud>,
    pub squash: Vec<SquashStretch>,
    pub ambient_angle: f32,
    pub events: Vec<SceneEvent>,
}
