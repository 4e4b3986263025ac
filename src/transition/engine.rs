//! Spawns and advances dissolve/reassemble jobs.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::easing::Easing;
use super::job::{Choreography, Particle, TransitionJob};
use crate::core::types::{JobId, Pose, Seconds, TargetId};

/// How progress advances each tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum StepMode {
    /// Constant increment per tick. Duration is a fixed tick count, which
    /// keeps runs reproducible regardless of frame rate.
    PerTick,
    /// Increment scaled by elapsed time over `reference_dt`, for wall-clock
    /// smoothness under variable frame rates.
    Elapsed { reference_dt: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    /// Particles seeded per job.
    pub particle_count: usize,
    /// Box extents (width, height, depth) the particles are scattered in.
    pub extents: [f32; 3],
    /// Burst speed range, uniform in [min, max).
    pub burst_speed_min: f32,
    pub burst_speed_max: f32,
    /// Peak multiplier on burst vectors at the end of the explode phase.
    pub burst_strength: f32,
    /// Cloud scale during the explode phase.
    pub expanded_scale: f32,
    /// Fraction of progress spent exploding; the rest converges.
    pub explode_ratio: f32,
    pub explode_easing: Easing,
    pub converge_easing: Easing,
    /// Progress added per tick (before any elapsed-time scaling).
    pub progress_step: f32,
    pub step_mode: StepMode,
    /// Fixed RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            particle_count: 1800,
            extents: [1.2, 1.5, 0.2],
            burst_speed_min: 0.3,
            burst_speed_max: 1.5,
            burst_strength: 1.5,
            expanded_scale: 3.5,
            explode_ratio: 0.25,
            explode_easing: Easing::InSine,
            converge_easing: Easing::InOutCubic,
            progress_step: 0.006,
            step_mode: StepMode::PerTick,
            seed: None,
        }
    }
}

impl TransitionConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.particle_count == 0 {
            return Err("particle_count must be positive".into());
        }
        if !(self.explode_ratio > 0.0 && self.explode_ratio < 1.0) {
            return Err(format!("explode_ratio ({}) must be in (0, 1)", self.explode_ratio));
        }
        if !(self.progress_step > 0.0 && self.progress_step <= 1.0) {
            return Err(format!("progress_step ({}) must be in (0, 1]", self.progress_step));
        }
        if self.burst_speed_min < 0.0 || self.burst_speed_max <= self.burst_speed_min {
            return Err(format!(
                "burst speed range [{}, {}) is empty or negative",
                self.burst_speed_min, self.burst_speed_max
            ));
        }
        if self.expanded_scale <= 0.0 || self.extents.iter().any(|e| *e < 0.0) {
            return Err("expanded_scale must be positive and extents non-negative".into());
        }
        if let StepMode::Elapsed { reference_dt } = self.step_mode {
            if reference_dt <= 0.0 {
                return Err(format!("reference_dt ({reference_dt}) must be positive"));
            }
        }
        Ok(())
    }

    fn choreography(&self) -> Choreography {
        Choreography {
            explode_ratio: self.explode_ratio,
            explode_easing: self.explode_easing,
            converge_easing: self.converge_easing,
            burst_strength: self.burst_strength,
            expanded_scale: self.expanded_scale,
        }
    }
}

/// A job that reached progress 1 this tick and was discarded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionCompletion {
    pub job: JobId,
    pub target: TargetId,
    pub destination: Pose,
}

pub struct TransitionEngine {
    config: TransitionConfig,
    choreography: Choreography,
    rng: ChaCha8Rng,
    jobs: Vec<TransitionJob>,
    next_id: u64,
}

impl TransitionEngine {
    pub fn new(config: TransitionConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            choreography: config.choreography(),
            config,
            rng,
            jobs: Vec::new(),
            next_id: 0,
        }
    }

    pub fn config(&self) -> &TransitionConfig {
        &self.config
    }

    pub fn jobs(&self) -> &[TransitionJob] {
        &self.jobs
    }

    pub fn active_count(&self) -> usize {
        self.jobs.len()
    }

    pub fn job_for(&self, target: TargetId) -> Option<&TransitionJob> {
        self.jobs.iter().find(|j| j.target == target)
    }

    /// Start a dissolve from `source` that reassembles at `destination`.
    pub fn spawn(&mut self, target: TargetId, source: Pose, destination: Pose, now: Seconds) -> JobId {
        let id = JobId(self.next_id);
        self.next_id += 1;

        let particles = self.seed_particles(&source);
        debug!(
            "Transition {:?} spawned for {:?} with {} particles",
            id,
            target,
            particles.len()
        );
        self.jobs.push(TransitionJob::new(
            id,
            target,
            source,
            destination,
            particles,
            now,
            &self.choreography,
        ));
        id
    }

    /// Advance every job by one tick. `dt` is only consulted in elapsed mode.
    /// Finished jobs are removed and reported.
    pub fn advance(&mut self, dt: f32) -> Vec<TransitionCompletion> {
        let increment = match self.config.step_mode {
            StepMode::PerTick => self.config.progress_step,
            StepMode::Elapsed { reference_dt } => self.config.progress_step * (dt.max(0.0) / reference_dt),
        };

        for job in &mut self.jobs {
            job.advance(increment, &self.choreography);
        }

        let mut completions = Vec::new();
        self.jobs.retain(|job| {
            if job.is_complete() {
                completions.push(TransitionCompletion {
                    job: job.id,
                    target: job.target,
                    destination: job.destination,
                });
                false
            } else {
                true
            }
        });
        for c in &completions {
            debug!("Transition {:?} for {:?} complete", c.job, c.target);
        }
        completions
    }

    /// Volumetric jitter inside the target's box, rotated into the source
    /// orientation, each particle with a random unit burst direction.
    fn seed_particles(&mut self, source: &Pose) -> Vec<Particle> {
        let half = Vec3::from(self.config.extents) * 0.5;
        let (speed_min, speed_max) = (self.config.burst_speed_min, self.config.burst_speed_max);
        (0..self.config.particle_count)
            .map(|_| {
                let local = Vec3::new(
                    self.rng.gen_range(-1.0f32..=1.0) * half.x,
                    self.rng.gen_range(-1.0f32..=1.0) * half.y,
                    self.rng.gen_range(-1.0f32..=1.0) * half.z,
                );
                let direction = random_unit(&mut self.rng);
                let speed = self.rng.gen_range(speed_min..speed_max);
                Particle {
                    offset: source.orientation * local,
                    burst: direction * speed,
                }
            })
            .collect()
    }
}

fn random_unit(rng: &mut ChaCha8Rng) -> Vec3 {
    loop {
        let v = Vec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        let len_sq = v.length_squared();
        if len_sq > 1e-6 && len_sq <= 1.0 {
            return v / len_sq.sqrt();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(step: f32) -> TransitionEngine {
        TransitionEngine::new(TransitionConfig {
            particle_count: 64,
            progress_step: step,
            seed: Some(7),
            ..TransitionConfig::default()
        })
    }

    #[test]
    fn test_fixed_tick_count() {
        let mut e = engine(0.25);
        e.spawn(TargetId(0), Pose::at(Vec3::Y), Pose::default(), 0.0);
        for _ in 0..3 {
            assert!(e.advance(0.016).is_empty());
        }
        let done = e.advance(0.016);
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].target, TargetId(0));
        assert_eq!(e.active_count(), 0);
    }

    #[test]
    fn test_particle_count_constant() {
        let mut e = engine(0.1);
        e.spawn(TargetId(3), Pose::at(Vec3::X), Pose::default(), 0.0);
        while e.active_count() > 0 {
            let job = &e.jobs()[0];
            assert_eq!(job.particle_count(), 64);
            assert_eq!(job.positions().len(), 64);
            e.advance(0.016);
        }
    }

    #[test]
    fn test_concurrent_jobs() {
        let mut e = engine(0.25);
        e.spawn(TargetId(0), Pose::default(), Pose::default(), 0.0);
        e.advance(0.016);
        e.advance(0.016);
        e.spawn(TargetId(1), Pose::default(), Pose::default(), 0.1);
        assert_eq!(e.active_count(), 2);
        let first = e.advance(0.016);
        assert!(first.is_empty());
        let second = e.advance(0.016);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].target, TargetId(0));
        assert!(e.job_for(TargetId(1)).is_some());
    }

    #[test]
    fn test_elapsed_mode_scales_increment() {
        let mut e = TransitionEngine::new(TransitionConfig {
            particle_count: 8,
            progress_step: 0.1,
            step_mode: StepMode::Elapsed { reference_dt: 0.02 },
            seed: Some(1),
            ..TransitionConfig::default()
        });
        e.spawn(TargetId(0), Pose::default(), Pose::default(), 0.0);
        e.advance(0.01);
        assert!((e.jobs()[0].progress() - 0.05).abs() < 1e-6);
        e.advance(0.04);
        assert!((e.jobs()[0].progress() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_seeded_engines_match() {
        let mut a = engine(0.1);
        let mut b = engine(0.1);
        a.spawn(TargetId(0), Pose::default(), Pose::default(), 0.0);
        b.spawn(TargetId(0), Pose::default(), Pose::default(), 0.0);
        assert_eq!(a.jobs()[0].particles(), b.jobs()[0].particles());
    }

    #[test]
    fn test_particles_inside_extents() {
        let mut e = engine(0.1);
        e.spawn(TargetId(0), Pose::default(), Pose::default(), 0.0);
        for p in e.jobs()[0].particles() {
            assert!(p.offset.x.abs() <= 0.6 + 1e-6);
            assert!(p.offset.y.abs() <= 0.75 + 1e-6);
            assert!(p.offset.z.abs() <= 0.1 + 1e-6);
            let speed = p.burst.length();
            assert!((0.3 - 1e-5..1.5 + 1e-5).contains(&speed));
        }
    }

    #[test]
    fn test_validate() {
        assert!(TransitionConfig::default().validate().is_ok());
        let bad = TransitionConfig {
            explode_ratio: 1.0,
            ..TransitionConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
