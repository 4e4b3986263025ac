//! Gesture classification from raw landmarks.
//!
//! Each tick the classifier turns the detector's landmark sets into a
//! `GestureSample`: smoothed continuous signals (openness, velocity) plus
//! boolean predicates. Click-like predicates run through hysteresis gates.
//! Losing the hand decays continuous signals and drops every gate at once.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::hysteresis::{GateThresholds, HysteresisGate};
use super::signals::{self, HEART_JOINTS, PRAYER_JOINTS};
use super::smoothing::{Ema, VelocityConfig, VelocityTracker};
use crate::core::types::Seconds;
use crate::landmarks::{HandJoint, HandLandmarks, LandmarkFrame};

/// Openness below this after decay snaps to zero.
const OPENNESS_SNAP: f32 = 1e-3;

/// Discrete gestures the classifier reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureKind {
    Open,
    Grab,
    Pinch,
    Wave,
    Prayer,
    Heart,
    Blow,
}

impl GestureKind {
    pub const ALL: [GestureKind; 7] = [
        Self::Open,
        Self::Grab,
        Self::Pinch,
        Self::Wave,
        Self::Prayer,
        Self::Heart,
        Self::Blow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Grab => "grab",
            Self::Pinch => "pinch",
            Self::Wave => "wave",
            Self::Prayer => "prayer",
            Self::Heart => "heart",
            Self::Blow => "blow",
        }
    }
}

/// Classifier thresholds. Defaults are the tuned values shared by the
/// photo-ornament and strike scenes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Multiplier on wrist→middle-knuckle distance used as the openness
    /// reference length.
    pub hand_scale: f32,
    /// EMA factor for openness (smaller = steadier, slower).
    pub openness_smoothing: f32,
    /// Smoothed openness above this reads as an open hand.
    pub open_threshold: f32,
    /// Fold-ratio gate driving `is_grabbing`.
    pub grab: GateThresholds,
    /// Thumb/index over palm-size gate driving `is_pinching`.
    pub pinch: GateThresholds,
    /// Max paired gap (wrists, index tips) gate driving `is_prayer`.
    pub prayer: GateThresholds,
    /// Max paired gap (thumb tips, index tips) gate driving `is_heart`.
    pub heart: GateThresholds,
    /// Max(mouthPucker, mouthFunnel) gate driving `is_blowing`.
    pub blow: GateThresholds,
    /// Thumb-to-pinky spread above which the hand reads as waving.
    pub wave_spread: f32,
    /// Thumb counts as extended past this multiple of palm size from the
    /// pinky knuckle.
    pub thumb_extension: f32,
    /// A finger counts as extended when its tip reaches this multiple of its
    /// knuckle's distance from the wrist.
    pub finger_extension: f32,
    pub velocity: VelocityConfig,
    /// Per-tick multiplier on speed/velocity while no hand is tracked.
    pub loss_speed_decay: f32,
    /// Per-tick multiplier on openness while no hand is tracked.
    pub loss_openness_decay: f32,
    /// Speed below this snaps to zero while decaying.
    pub loss_snap_epsilon: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            hand_scale: 1.2,
            openness_smoothing: 0.2,
            open_threshold: 0.7,
            grab: GateThresholds::below(1.05, 1.15),
            pinch: GateThresholds::below(0.35, 0.45),
            prayer: GateThresholds::below(0.2, 0.25),
            heart: GateThresholds::below(0.15, 0.18),
            blow: GateThresholds::above(0.4, 0.3),
            wave_spread: 0.25,
            thumb_extension: 0.8,
            finger_extension: 1.1,
            velocity: VelocityConfig::default(),
            loss_speed_decay: 0.8,
            loss_openness_decay: 0.9,
            loss_snap_epsilon: 0.1,
        }
    }
}

impl GestureConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.grab.validate("grab")?;
        self.pinch.validate("pinch")?;
        self.prayer.validate("prayer")?;
        self.heart.validate("heart")?;
        self.blow.validate("blow")?;

        for (name, factor) in [
            ("openness_smoothing", self.openness_smoothing),
            ("velocity.smoothing", self.velocity.smoothing),
        ] {
            if !(factor > 0.0 && factor <= 1.0) {
                return Err(format!("{name} ({factor}) must be in (0, 1]"));
            }
        }
        for (name, factor) in [
            ("loss_speed_decay", self.loss_speed_decay),
            ("loss_openness_decay", self.loss_openness_decay),
        ] {
            if !(0.0..1.0).contains(&factor) {
                return Err(format!("{name} ({factor}) must be in [0, 1)"));
            }
        }
        if self.hand_scale <= 0.0 {
            return Err(format!("hand_scale ({}) must be positive", self.hand_scale));
        }
        if self.velocity.max_speed <= 0.0 || self.velocity.sample_interval < 0.0 {
            return Err("velocity max_speed must be positive and sample_interval non-negative".into());
        }
        Ok(())
    }
}

/// One tick's derived signals. Recomputed every tick, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct GestureSample {
    /// Smoothed thumb/index spread, [0,1].
    pub openness: f32,
    pub is_open: bool,
    /// Raw fold ratio this tick; `None` without a usable hand.
    pub fold_ratio: Option<f32>,
    /// Smoothed, clamped velocity of the mirrored wrist.
    pub velocity: Vec2,
    /// Smoothed speed magnitude.
    pub speed: f32,
    pub hand_present: bool,
    pub face_present: bool,
    pub hand_count: usize,
    pub is_grabbing: bool,
    pub is_pinching: bool,
    pub is_waving: bool,
    pub is_prayer: bool,
    pub is_heart: bool,
    pub is_blowing: bool,
    pub finger_count: u8,
}

impl GestureSample {
    pub fn is_active(&self, kind: GestureKind) -> bool {
        match kind {
            GestureKind::Open => self.is_open,
            GestureKind::Grab => self.is_grabbing,
            GestureKind::Pinch => self.is_pinching,
            GestureKind::Wave => self.is_waving,
            GestureKind::Prayer => self.is_prayer,
            GestureKind::Heart => self.is_heart,
            GestureKind::Blow => self.is_blowing,
        }
    }
}

struct Gates {
    grab: HysteresisGate,
    pinch: HysteresisGate,
    prayer: HysteresisGate,
    heart: HysteresisGate,
    blow: HysteresisGate,
}

impl Gates {
    fn new(config: &GestureConfig) -> Self {
        Self {
            grab: HysteresisGate::new(config.grab),
            pinch: HysteresisGate::new(config.pinch),
            prayer: HysteresisGate::new(config.prayer),
            heart: HysteresisGate::new(config.heart),
            blow: HysteresisGate::new(config.blow),
        }
    }

    fn drop_hand_gates(&mut self) {
        self.grab.force_inactive();
        self.pinch.force_inactive();
        self.drop_pair_gates();
    }

    fn drop_pair_gates(&mut self) {
        self.prayer.force_inactive();
        self.heart.force_inactive();
    }
}

/// Ratios computed from the primary hand. Absent when any reference length
/// is degenerate.
struct HandSignals {
    openness: f32,
    fold: f32,
    pinch: f32,
    spread: f32,
    fingers: u8,
    reference_point: Vec2,
}

impl HandSignals {
    fn measure(hand: &HandLandmarks, config: &GestureConfig) -> Option<Self> {
        let wrist = hand.joint(HandJoint::Wrist)?;
        Some(Self {
            openness: signals::openness_ratio(hand, config.hand_scale)?,
            fold: signals::fold_ratio(hand)?,
            pinch: signals::pinch_ratio(hand)?,
            spread: signals::spread(hand)?,
            fingers: signals::finger_count(hand, config.thumb_extension, config.finger_extension)?,
            // Mirrored so moving the hand right on a selfie camera reads as +x
            // and moving it up reads as +y.
            reference_point: Vec2::new(1.0 - wrist.x, 1.0 - wrist.y),
        })
    }
}

pub struct GestureClassifier {
    config: GestureConfig,
    gates: Gates,
    openness: Ema,
    velocity: VelocityTracker,
    last: GestureSample,
}

impl GestureClassifier {
    pub fn new(config: GestureConfig) -> Self {
        let gates = Gates::new(&config);
        let openness = Ema::new(config.openness_smoothing);
        let velocity = VelocityTracker::new(config.velocity);
        Self {
            config,
            gates,
            openness,
            velocity,
            last: GestureSample::default(),
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// The sample produced by the most recent `update`.
    pub fn last_sample(&self) -> &GestureSample {
        &self.last
    }

    /// Consume this tick's landmarks and return the derived sample.
    ///
    /// Malformed or missing hand data is handled exactly like "no hand".
    pub fn update(&mut self, frame: &LandmarkFrame, now: Seconds) -> GestureSample {
        let mut sample = GestureSample {
            hand_count: frame.hands.len(),
            ..GestureSample::default()
        };

        let measured = frame
            .primary_hand()
            .and_then(|hand| HandSignals::measure(hand, &self.config));

        match measured {
            Some(hand) => self.track_hand(&hand, now, &mut sample),
            None => self.lose_hand(&mut sample),
        }

        if sample.hand_present {
            self.track_pair(frame, &mut sample);
        }
        self.track_face(frame, &mut sample);

        self.log_flips(&sample);
        self.last = sample;
        sample
    }

    fn track_hand(&mut self, hand: &HandSignals, now: Seconds, sample: &mut GestureSample) {
        sample.hand_present = true;
        sample.fold_ratio = Some(hand.fold);

        sample.openness = self.openness.update(hand.openness);
        sample.is_open = sample.openness > self.config.open_threshold;

        self.velocity.update(hand.reference_point, now);
        sample.velocity = self.velocity.velocity();
        sample.speed = self.velocity.speed();

        sample.is_grabbing = self.gates.grab.update(hand.fold);
        sample.is_pinching = self.gates.pinch.update(hand.pinch);
        sample.is_waving = hand.spread > self.config.wave_spread;
        sample.finger_count = hand.fingers;
    }

    fn lose_hand(&mut self, sample: &mut GestureSample) {
        self.velocity
            .decay(self.config.loss_speed_decay, self.config.loss_snap_epsilon);
        sample.velocity = self.velocity.velocity();
        sample.speed = self.velocity.speed();
        sample.openness = self
            .openness
            .decay(self.config.loss_openness_decay, OPENNESS_SNAP);
        self.gates.drop_hand_gates();
    }

    fn track_pair(&mut self, frame: &LandmarkFrame, sample: &mut GestureSample) {
        let Some((a, b)) = frame.hand_pair() else {
            self.gates.drop_pair_gates();
            return;
        };
        if let Some(gap) = signals::max_joint_gap(a, b, &PRAYER_JOINTS) {
            sample.is_prayer = self.gates.prayer.update(gap);
        }
        if let Some(gap) = signals::max_joint_gap(a, b, &HEART_JOINTS) {
            sample.is_heart = self.gates.heart.update(gap);
        }
    }

    fn track_face(&mut self, frame: &LandmarkFrame, sample: &mut GestureSample) {
        match &frame.face {
            Some(face) => {
                sample.face_present = true;
                let score = face.score("mouthPucker").max(face.score("mouthFunnel"));
                sample.is_blowing = self.gates.blow.update(score);
            }
            None => self.gates.blow.force_inactive(),
        }
    }

    fn log_flips(&self, sample: &GestureSample) {
        for kind in GestureKind::ALL {
            let was = self.last.is_active(kind);
            let now = sample.is_active(kind);
            if was != now {
                debug!("Gesture {} {}", kind.as_str(), if now { "started" } else { "ended" });
            }
        }
        if self.last.hand_present && !sample.hand_present {
            debug!("Hand tracking lost");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::synthetic::{frame_for, hand_with_fold_ratio, ScriptedPose};

    const WRIST: Vec2 = Vec2::new(0.5, 0.8);

    fn classifier() -> GestureClassifier {
        GestureClassifier::new(GestureConfig::default())
    }

    #[test]
    fn test_fold_ratio_scenario_through_classifier() {
        let mut c = classifier();
        let grabbing: Vec<bool> = [1.3, 1.0, 1.08, 0.95, 1.4]
            .iter()
            .enumerate()
            .map(|(i, &r)| {
                let frame = LandmarkFrame::with_hands(vec![hand_with_fold_ratio(WRIST, r)]);
                c.update(&frame, i as f64 * 0.1).is_grabbing
            })
            .collect();
        assert_eq!(grabbing, vec![false, true, true, true, false]);
    }

    #[test]
    fn test_open_hand_becomes_open_after_smoothing() {
        let mut c = classifier();
        let frame = frame_for(ScriptedPose::Open, WRIST);
        let first = c.update(&frame, 0.0);
        assert!(!first.is_open, "one tick of EMA should not reach the cut");
        let mut sample = first;
        for i in 1..20 {
            sample = c.update(&frame, i as f64 * 0.016);
        }
        assert!(sample.is_open);
        assert!(sample.openness <= 1.0);
        assert!(!sample.is_grabbing);
        assert_eq!(sample.finger_count, 5);
        assert!(sample.is_waving);
    }

    #[test]
    fn test_loss_of_tracking_drops_all_gates() {
        let mut c = classifier();
        let prayer = frame_for(ScriptedPose::Prayer, WRIST);
        c.update(&frame_for(ScriptedPose::Fist, WRIST), 0.0);
        let s = c.update(&prayer, 0.1);
        assert!(s.is_prayer && s.is_heart);

        c.update(&frame_for(ScriptedPose::Fist, WRIST), 0.2);
        assert!(c.last_sample().is_grabbing);

        let lost = c.update(&LandmarkFrame::empty(), 0.3);
        assert!(!lost.hand_present);
        assert!(!lost.is_grabbing);
        assert!(!lost.is_pinching);
        assert!(!lost.is_prayer);
        assert!(!lost.is_heart);
        assert!(!lost.is_open);
        assert_eq!(lost.finger_count, 0);
    }

    #[test]
    fn test_loss_decays_rather_than_snaps() {
        let mut c = classifier();
        for i in 0..30 {
            c.update(&frame_for(ScriptedPose::Open, WRIST), i as f64 * 0.016);
        }
        let before = c.last_sample().openness;
        let after = c.update(&LandmarkFrame::empty(), 0.5).openness;
        assert!((after - before * 0.9).abs() < 1e-5);
    }

    #[test]
    fn test_malformed_hand_is_no_hand() {
        let mut c = classifier();
        c.update(&frame_for(ScriptedPose::Fist, WRIST), 0.0);
        assert!(c.last_sample().is_grabbing);
        let mut broken = frame_for(ScriptedPose::Fist, WRIST);
        broken.hands[0].points.truncate(10);
        let s = c.update(&broken, 0.1);
        assert!(!s.hand_present);
        assert!(!s.is_grabbing);
    }

    #[test]
    fn test_pinch_detected() {
        let mut c = classifier();
        let s = c.update(&frame_for(ScriptedPose::Pinch, WRIST), 0.0);
        assert!(s.is_pinching);
        assert!(!s.is_grabbing);
    }

    #[test]
    fn test_heart_without_prayer() {
        let mut c = classifier();
        let s = c.update(&frame_for(ScriptedPose::Heart, WRIST), 0.0);
        assert!(s.is_heart);
        assert!(!s.is_prayer);
    }

    #[test]
    fn test_single_hand_clears_pair_gestures() {
        let mut c = classifier();
        assert!(c.update(&frame_for(ScriptedPose::Prayer, WRIST), 0.0).is_prayer);
        let s = c.update(&frame_for(ScriptedPose::Open, WRIST), 0.1);
        assert!(!s.is_prayer);
    }

    #[test]
    fn test_blow_from_face() {
        let mut c = classifier();
        let s = c.update(&frame_for(ScriptedPose::Blow, WRIST), 0.0);
        assert!(s.face_present);
        assert!(s.is_blowing);
        assert!(!s.hand_present);
        let s = c.update(&LandmarkFrame::empty(), 0.1);
        assert!(!s.is_blowing);
    }

    #[test]
    fn test_downward_motion_has_negative_vy() {
        let mut c = classifier();
        for i in 0..10 {
            let wrist = WRIST + Vec2::new(0.0, 0.02 * i as f32);
            c.update(&frame_for(ScriptedPose::Open, wrist), i as f64 * 0.06);
        }
        assert!(c.last_sample().velocity.y < -1.0);
        assert!(c.last_sample().velocity.x.abs() < 1e-3);
    }

    #[test]
    fn test_default_config_validates() {
        assert!(GestureConfig::default().validate().is_ok());
        let mut bad = GestureConfig::default();
        bad.loss_speed_decay = 1.0;
        assert!(bad.validate().is_err());
    }
}
