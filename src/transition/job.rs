//! A single dissolve/reassemble animation.
//!
//! The job owns a fixed particle set seeded at spawn. Progress runs 0→1 in
//! two phases: the cloud bursts outward around the source pose, then the
//! burst collapses while the centroid travels to the destination and the
//! cloud shrinks back to unit scale.

use glam::{Quat, Vec3};

use super::easing::Easing;
use crate::core::types::{JobId, Pose, Seconds, TargetId};

/// One particle's spawn-time parameters. Never modified after spawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Rest offset from the centroid, already rotated into the source frame.
    pub offset: Vec3,
    /// Burst direction scaled by this particle's speed.
    pub burst: Vec3,
}

/// Phase boundaries and curves shared by every job of an engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Choreography {
    /// Fraction of total progress spent exploding.
    pub explode_ratio: f32,
    pub explode_easing: Easing,
    pub converge_easing: Easing,
    /// Peak burst displacement multiplier.
    pub burst_strength: f32,
    /// Cloud scale while exploding; shrinks to 1 during convergence.
    pub expanded_scale: f32,
}

/// Instantaneous shape of the cloud at some progress value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudShape {
    /// Multiplier on every particle's burst vector.
    pub strength: f32,
    /// Eased travel from source (0) to destination (1).
    pub travel: f32,
    /// Multiplier on every particle's rest offset.
    pub scale: f32,
}

impl Choreography {
    pub fn shape_at(&self, progress: f32) -> CloudShape {
        let progress = progress.clamp(0.0, 1.0);
        if progress < self.explode_ratio {
            let t = progress / self.explode_ratio;
            CloudShape {
                strength: self.burst_strength * self.explode_easing.apply(t),
                travel: 0.0,
                scale: self.expanded_scale,
            }
        } else {
            let t = (progress - self.explode_ratio) / (1.0 - self.explode_ratio);
            let e = self.converge_easing.apply(t);
            CloudShape {
                strength: self.burst_strength * (1.0 - e),
                travel: e,
                scale: self.expanded_scale * (1.0 - e) + e,
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransitionJob {
    pub id: JobId,
    pub target: TargetId,
    pub source: Pose,
    pub destination: Pose,
    pub started_at: Seconds,
    progress: f32,
    particles: Vec<Particle>,
    positions: Vec<Vec3>,
    shape: CloudShape,
}

impl TransitionJob {
    pub(crate) fn new(
        id: JobId,
        target: TargetId,
        source: Pose,
        destination: Pose,
        particles: Vec<Particle>,
        started_at: Seconds,
        choreography: &Choreography,
    ) -> Self {
        let mut job = Self {
            id,
            target,
            source,
            destination,
            started_at,
            progress: 0.0,
            positions: vec![Vec3::ZERO; particles.len()],
            particles,
            shape: choreography.shape_at(0.0),
        };
        job.reshape(choreography);
        job
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Current particle positions in the cloud's local frame: relative to
    /// the travelling centroid (`current_pose().position`), world-aligned
    /// axes. Centroid travel is not included.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Current particle positions in the parent frame.
    pub fn world_positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        let centroid = self.centroid();
        self.positions.iter().map(move |p| *p + centroid)
    }

    fn centroid(&self) -> Vec3 {
        self.source
            .position
            .lerp(self.destination.position, self.shape.travel)
    }

    pub fn shape(&self) -> CloudShape {
        self.shape
    }

    /// Pose of the cloud as a whole: interpolated centroid and orientation,
    /// uniform cloud scale.
    pub fn current_pose(&self) -> Pose {
        let t = self.shape.travel;
        Pose {
            position: self.centroid(),
            orientation: slerp(self.source.orientation, self.destination.orientation, t),
            scale: Vec3::splat(self.shape.scale),
        }
    }

    /// Move progress forward by `increment`, clamped at 1.
    pub(crate) fn advance(&mut self, increment: f32, choreography: &Choreography) {
        self.progress = (self.progress + increment.max(0.0)).min(1.0);
        self.reshape(choreography);
    }

    fn reshape(&mut self, choreography: &Choreography) {
        self.shape = choreography.shape_at(self.progress);
        let CloudShape { strength, scale, .. } = self.shape;
        for (pos, particle) in self.positions.iter_mut().zip(&self.particles) {
            *pos = particle.offset * scale + particle.burst * strength;
        }
    }
}

fn slerp(a: Quat, b: Quat, t: f32) -> Quat {
    if t <= 0.0 {
        a
    } else if t >= 1.0 {
        b
    } else {
        a.slerp(b, t)
    }
}
