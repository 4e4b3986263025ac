//! Selectable scene objects.

use serde::Serialize;

use crate::core::types::{Pose, Seconds, TargetId};

/// Lifecycle state of one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetState {
    #[default]
    Idle,
    /// Picked by a grab, waiting for the grab to be confirmed.
    Candidate,
    /// Held enlarged in front of the viewer.
    Locked,
    /// Dissolving back to its rest pose.
    Dissolving,
}

impl TargetState {
    /// Locked and dissolving targets hold the session's single active slot.
    pub fn holds_active_slot(&self) -> bool {
        matches!(self, TargetState::Locked | TargetState::Dissolving)
    }
}

#[derive(Debug, Clone)]
pub struct InteractionTarget {
    pub id: TargetId,
    pub rest_pose: Pose,
    /// Pose the target is presented at right now.
    pub pose: Pose,
    pub state: TargetState,
    pub candidate_since: Option<Seconds>,
    pub lock_start_time: Option<Seconds>,
}

impl InteractionTarget {
    pub fn new(id: TargetId, rest_pose: Pose) -> Self {
        Self {
            id,
            rest_pose,
            pose: rest_pose,
            state: TargetState::Idle,
            candidate_since: None,
            lock_start_time: None,
        }
    }

    /// Back to rest: exact rest pose, no timers.
    pub(crate) fn reset(&mut self) {
        self.state = TargetState::Idle;
        self.pose = self.rest_pose;
        self.candidate_since = None;
        self.lock_start_time = None;
    }
}

/// What the render layer needs per target each tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TargetView {
    pub id: TargetId,
    pub state: TargetState,
    pub pose: Pose,
    /// Dissolve progress while dissolving.
    pub progress: Option<f32>,
}
