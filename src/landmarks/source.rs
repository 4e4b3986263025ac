//! Landmark sources: the per-tick input boundary of the interaction core.

use std::fs;
use std::path::Path;

use glam::Vec2;
use tracing::warn;

use super::hand::LandmarkFrame;
use super::synthetic::{frame_for, ScriptedPose};
use crate::core::error::Result;
use crate::core::types::Seconds;

/// Supplies one landmark frame per processing tick.
///
/// An empty frame means tracking was lost for that tick.
pub trait LandmarkSource {
    fn poll(&mut self, now: Seconds) -> LandmarkFrame;
}

/// One segment of a scripted session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptStep {
    /// How long the pose is held (seconds).
    pub duration: Seconds,
    pub pose: ScriptedPose,
    /// Wrist velocity in normalized units per second while this step runs.
    pub motion: Vec2,
}

impl ScriptStep {
    pub fn hold(pose: ScriptedPose, duration: Seconds) -> Self {
        Self {
            duration,
            pose,
            motion: Vec2::ZERO,
        }
    }

    pub fn moving(pose: ScriptedPose, duration: Seconds, motion: Vec2) -> Self {
        Self {
            duration,
            pose,
            motion,
        }
    }
}

/// Plays back a timed list of synthetic poses.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    steps: Vec<ScriptStep>,
    origin: Vec2,
    looping: bool,
}

impl ScriptedSource {
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self {
            steps,
            origin: Vec2::new(0.5, 0.8),
            looping: false,
        }
    }

    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    /// Total scripted time of one pass.
    pub fn duration(&self) -> Seconds {
        self.steps.iter().map(|s| s.duration).sum()
    }

    /// Grab, hold past the dwell, release, then idle long enough for the
    /// dissolve and cooldown to finish. Repeats `cycles` times.
    pub fn grab_release_demo(cycles: usize) -> Self {
        let mut steps = Vec::with_capacity(cycles * 4);
        for _ in 0..cycles {
            steps.push(ScriptStep::hold(ScriptedPose::Open, 0.5));
            steps.push(ScriptStep::hold(ScriptedPose::Fist, 2.0));
            steps.push(ScriptStep::hold(ScriptedPose::Open, 3.5));
            steps.push(ScriptStep::moving(ScriptedPose::Open, 0.6, Vec2::new(0.0, -0.6)));
        }
        Self::new(steps)
    }

    fn step_at(&self, now: Seconds) -> Option<(ScriptStep, Seconds)> {
        let total = self.duration();
        if total <= 0.0 || now < 0.0 {
            return None;
        }
        let mut t = if self.looping { now % total } else { now };
        for step in &self.steps {
            if t < step.duration {
                return Some((*step, t));
            }
            t -= step.duration;
        }
        None
    }
}

impl LandmarkSource for ScriptedSource {
    fn poll(&mut self, now: Seconds) -> LandmarkFrame {
        match self.step_at(now) {
            Some((step, elapsed)) => {
                let wrist = self.origin + step.motion * elapsed as f32;
                frame_for(step.pose, wrist)
            }
            None => LandmarkFrame::empty(),
        }
    }
}

/// Replays frames captured as JSON lines, one frame per tick.
#[derive(Debug, Clone, Default)]
pub struct RecordedSource {
    frames: Vec<LandmarkFrame>,
    cursor: usize,
}

impl RecordedSource {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::from_jsonl(&content))
    }

    /// Parse JSON lines. Blank lines are skipped; malformed lines become
    /// empty frames so tick numbering stays aligned with the capture.
    pub fn from_jsonl(content: &str) -> Self {
        let frames = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(n, line)| {
                serde_json::from_str::<LandmarkFrame>(line).unwrap_or_else(|e| {
                    warn!("Skipping malformed landmark line {}: {}", n + 1, e);
                    LandmarkFrame::empty()
                })
            })
            .collect();
        Self { frames, cursor: 0 }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.frames.len()
    }
}

impl LandmarkSource for RecordedSource {
    fn poll(&mut self, _now: Seconds) -> LandmarkFrame {
        let frame = self.frames.get(self.cursor).cloned().unwrap_or_default();
        self.cursor = (self.cursor + 1).min(self.frames.len());
        frame
    }
}
