//! Two-threshold bistable gate.
//!
//! A click-like predicate driven by a noisy scalar flickers when the signal
//! sits near a single cut. The gate only enters the active state past a tight
//! threshold and only leaves it past a looser one; values inside the band
//! keep whatever state the gate is already in.

use serde::{Deserialize, Serialize};

/// Which side of the thresholds counts as "active".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Active when the signal falls below `enter` (fold ratio, pinch ratio).
    Below,
    /// Active when the signal rises above `enter` (blow score).
    Above,
}

/// Thresholds for one gate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GateThresholds {
    pub enter: f32,
    pub exit: f32,
    pub polarity: Polarity,
}

impl GateThresholds {
    pub fn below(enter: f32, exit: f32) -> Self {
        Self {
            enter,
            exit,
            polarity: Polarity::Below,
        }
    }

    pub fn above(enter: f32, exit: f32) -> Self {
        Self {
            enter,
            exit,
            polarity: Polarity::Above,
        }
    }

    /// The exit threshold must be looser than the enter threshold.
    pub fn validate(&self, name: &str) -> Result<(), String> {
        if !self.enter.is_finite() || !self.exit.is_finite() {
            return Err(format!("{name}: thresholds must be finite"));
        }
        let ordered = match self.polarity {
            Polarity::Below => self.exit >= self.enter,
            Polarity::Above => self.exit <= self.enter,
        };
        if !ordered {
            return Err(format!(
                "{name}: exit ({}) must be looser than enter ({}) for {:?} polarity",
                self.exit, self.enter, self.polarity
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct HysteresisGate {
    thresholds: GateThresholds,
    active: bool,
}

impl HysteresisGate {
    pub fn new(thresholds: GateThresholds) -> Self {
        Self {
            thresholds,
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn thresholds(&self) -> GateThresholds {
        self.thresholds
    }

    /// Feed one sample and return the resulting state.
    ///
    /// Only the threshold for the currently inactive side is consulted.
    /// Non-finite samples leave the state unchanged.
    pub fn update(&mut self, signal: f32) -> bool {
        if !signal.is_finite() {
            return self.active;
        }
        let GateThresholds {
            enter,
            exit,
            polarity,
        } = self.thresholds;
        self.active = match (self.active, polarity) {
            (false, Polarity::Below) => signal < enter,
            (false, Polarity::Above) => signal > enter,
            (true, Polarity::Below) => signal <= exit,
            (true, Polarity::Above) => signal >= exit,
        };
        self.active
    }

    /// Drop to inactive without consulting any threshold (tracking loss).
    pub fn force_inactive(&mut self) {
        self.active = false;
    }
}
