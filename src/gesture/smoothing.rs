//! Signal smoothing: exponential moving average and a dead-zoned velocity
//! estimator for a tracked reference point.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::types::Seconds;

/// Exponential moving average, `value += (sample - value) * factor`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ema {
    pub value: f32,
    factor: f32,
}

impl Ema {
    pub fn new(factor: f32) -> Self {
        Self { value: 0.0, factor }
    }

    pub fn update(&mut self, sample: f32) -> f32 {
        self.value += (sample - self.value) * self.factor;
        self.value
    }

    /// Multiply toward zero, snapping once below `epsilon`.
    pub fn decay(&mut self, factor: f32, epsilon: f32) -> f32 {
        self.value *= factor;
        if self.value.abs() < epsilon {
            self.value = 0.0;
        }
        self.value
    }
}

/// Tuning for the velocity estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VelocityConfig {
    /// Minimum time between samples (seconds). Shorter gaps are skipped so a
    /// tiny Δt never amplifies detector jitter.
    pub sample_interval: f32,
    /// Displacements shorter than this (normalized units) read as stillness.
    pub dead_zone: f32,
    /// Multiplier from normalized units per second to output units.
    pub gain: f32,
    /// EMA factor applied to each new raw velocity.
    pub smoothing: f32,
    /// Output is clamped to ±this on each axis and in magnitude.
    pub max_speed: f32,
}

impl Default for VelocityConfig {
    fn default() -> Self {
        Self {
            sample_interval: 0.05,
            dead_zone: 0.005,
            gain: 5.0,
            smoothing: 0.3,
            max_speed: 30.0,
        }
    }
}

/// Smoothed velocity of one reference point.
#[derive(Debug, Clone)]
pub struct VelocityTracker {
    config: VelocityConfig,
    last: Option<(Vec2, Seconds)>,
    velocity: Vec2,
    speed: f32,
}

impl VelocityTracker {
    pub fn new(config: VelocityConfig) -> Self {
        Self {
            config,
            last: None,
            velocity: Vec2::ZERO,
            speed: 0.0,
        }
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Feed the reference point position for this tick.
    pub fn update(&mut self, position: Vec2, now: Seconds) {
        let Some((prev, prev_time)) = self.last else {
            self.last = Some((position, now));
            return;
        };

        let dt = (now - prev_time) as f32;
        if dt < self.config.sample_interval || dt <= 0.0 {
            return;
        }
        self.last = Some((position, now));

        let delta = position - prev;
        let (raw_velocity, raw_speed) = if delta.length() < self.config.dead_zone {
            (Vec2::ZERO, 0.0)
        } else {
            let v = delta / dt * self.config.gain;
            (v, v.length())
        };

        let s = self.config.smoothing;
        let max = self.config.max_speed;
        self.velocity += (raw_velocity - self.velocity) * s;
        self.velocity = self.velocity.clamp(Vec2::splat(-max), Vec2::splat(max));
        self.speed += (raw_speed - self.speed) * s;
        self.speed = self.speed.clamp(0.0, max);
    }

    /// Tracking lost: damp toward zero and forget the last position so the
    /// first sample after recovery does not produce a jump.
    pub fn decay(&mut self, factor: f32, epsilon: f32) {
        self.last = None;
        self.velocity *= factor;
        self.speed *= factor;
        if self.speed.abs() < epsilon {
            self.speed = 0.0;
            self.velocity = Vec2::ZERO;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ema_converges() {
        let mut ema = Ema::new(0.2);
        for _ in 0..100 {
            ema.update(1.0);
        }
        assert!((ema.value - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_ema_decay_snaps_to_zero() {
        let mut ema = Ema::new(0.2);
        ema.value = 0.11;
        assert!(ema.decay(0.8, 0.1) == 0.0);
    }

    #[test]
    fn test_dead_zone_suppresses_jitter() {
        let mut tracker = VelocityTracker::new(VelocityConfig::default());
        tracker.update(Vec2::new(0.5, 0.5), 0.0);
        tracker.update(Vec2::new(0.502, 0.5), 0.1);
        assert_eq!(tracker.velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_short_interval_is_skipped() {
        let mut tracker = VelocityTracker::new(VelocityConfig::default());
        tracker.update(Vec2::new(0.5, 0.5), 0.0);
        tracker.update(Vec2::new(0.6, 0.5), 0.01);
        assert_eq!(tracker.velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_velocity_direction_and_clamp() {
        let mut tracker = VelocityTracker::new(VelocityConfig::default());
        tracker.update(Vec2::new(0.2, 0.5), 0.0);
        tracker.update(Vec2::new(0.3, 0.5), 0.1);
        // raw = 0.1 / 0.1 * 5 = 5, smoothed by 0.3
        assert!((tracker.velocity().x - 1.5).abs() < 1e-4);
        assert_eq!(tracker.velocity().y, 0.0);

        for i in 2..50 {
            tracker.update(Vec2::new(0.3 + i as f32, 0.5), i as f64 * 0.1);
        }
        assert!(tracker.velocity().x <= 30.0);
        assert!(tracker.speed() <= 30.0);
    }

    #[test]
    fn test_decay_forgets_last_position() {
        let mut tracker = VelocityTracker::new(VelocityConfig::default());
        tracker.update(Vec2::new(0.2, 0.5), 0.0);
        tracker.update(Vec2::new(0.3, 0.5), 0.1);
        tracker.decay(0.8, 0.1);
        tracker.update(Vec2::new(0.9, 0.5), 0.2);
        assert!(tracker.velocity().x < 1.5);
    }
}
