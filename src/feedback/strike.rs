//! Percussive strike detection from hand motion.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::types::Seconds;
use crate::gesture::GestureSample;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrikeConfig {
    pub enabled: bool,
    /// Smoothed vertical velocity below this counts as a downward swing.
    pub downward_velocity: f32,
    /// Swings with more horizontal velocity than this are swipes, not strikes.
    pub max_lateral_velocity: f32,
    /// Minimum time between swing strikes (seconds).
    pub refractory: f32,
    /// While the prayer gesture holds, strikes repeat at this interval.
    /// Zero disables prayer strikes.
    pub prayer_interval: f32,
}

impl Default for StrikeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            downward_velocity: -1.5,
            max_lateral_velocity: 6.0,
            refractory: 0.2,
            prayer_interval: 0.3,
        }
    }
}

impl StrikeConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.refractory < 0.0 || self.prayer_interval < 0.0 {
            return Err("strike refractory and prayer_interval must be non-negative".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrikeSource {
    Swing,
    Prayer,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Strike {
    pub source: StrikeSource,
    /// Running total including this strike.
    pub count: u64,
}

#[derive(Debug, Clone)]
pub struct StrikeDetector {
    config: StrikeConfig,
    last_strike: Option<Seconds>,
    count: u64,
}

impl StrikeDetector {
    pub fn new(config: StrikeConfig) -> Self {
        Self {
            config,
            last_strike: None,
            count: 0,
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// At most one strike per tick.
    pub fn update(&mut self, sample: &GestureSample, now: Seconds) -> Option<Strike> {
        if !self.config.enabled {
            return None;
        }
        let since_last = self.last_strike.map(|t| now - t);

        let candidate = if sample.is_prayer && self.config.prayer_interval > 0.0 {
            let due = since_last.map_or(true, |dt| dt >= self.config.prayer_interval as f64);
            due.then_some(StrikeSource::Prayer)
        } else {
            let swing = sample.hand_present
                && sample.velocity.y < self.config.downward_velocity
                && sample.velocity.x.abs() < self.config.max_lateral_velocity;
            let rested = since_last.map_or(true, |dt| dt >= self.config.refractory as f64);
            (swing && rested).then_some(StrikeSource::Swing)
        };
        let source = candidate?;

        self.last_strike = Some(now);
        self.count += 1;
        debug!("Strike #{} ({:?})", self.count, source);
        Some(Strike {
            source,
            count: self.count,
        })
    }
}
