//! Tick system - orchestrates one scene update
//!
//! This is the core loop that ties together:
//! landmarks -> gesture sample -> interaction lifecycle -> transitions -> strikes -> springs
//!
//! Each tick runs every stage once, in that order, on a single thread.
//! Listeners hear about the tick only after all stages have resolved.

use ahash::AHashSet;
use tracing::{debug, trace};

use crate::core::config::SceneConfig;
use crate::core::error::{GiftError, Result};
use crate::core::types::{Seconds, Tick};
use crate::feedback::{SpringState, StrikeDetector};
use crate::gesture::{GestureClassifier, GestureKind, GestureSample};
use crate::interaction::{InteractionController, InteractionTarget};
use crate::landmarks::LandmarkFrame;
use crate::transition::TransitionEngine;

use super::events::{EventListener, SceneEvent};
use super::frame::{ParticleCloud, SceneFrame};

pub struct Scene {
    config: SceneConfig,
    classifier: GestureClassifier,
    controller: InteractionController,
    engine: TransitionEngine,
    strikes: StrikeDetector,
    springs: Vec<SpringState>,
    listeners: Vec<Box<dyn EventListener>>,
    previous: GestureSample,
    last_time: Option<Seconds>,
    tick: Tick,
}

impl Scene {
    /// Validates `config` and rejects duplicate target ids.
    pub fn new(config: SceneConfig, targets: Vec<InteractionTarget>) -> Result<Self> {
        config.validate()?;
        let mut seen = AHashSet::new();
        if let Some(dup) = targets.iter().find(|t| !seen.insert(t.id)) {
            return Err(GiftError::InvalidConfig(format!(
                "duplicate target id {:?}",
                dup.id
            )));
        }
        debug!(
            "Scene '{}' with {} targets and {} springs",
            config.name,
            targets.len(),
            config.springs.len()
        );

        Ok(Self {
            classifier: GestureClassifier::new(config.gesture.clone()),
            controller: InteractionController::new(config.interaction.clone(), targets),
            engine: TransitionEngine::new(config.transition.clone()),
            strikes: StrikeDetector::new(config.strike),
            springs: config.springs.iter().copied().map(SpringState::new).collect(),
            listeners: Vec::new(),
            previous: GestureSample::default(),
            last_time: None,
            tick: 0,
            config,
        })
    }

    /// Scene with targets placed by the configured layout.
    pub fn from_config(config: SceneConfig) -> Result<Self> {
        let targets = config.layout.build_targets();
        Self::new(config, targets)
    }

    pub fn add_listener(&mut self, listener: Box<dyn EventListener>) {
        self.listeners.push(listener);
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn engine(&self) -> &TransitionEngine {
        &self.engine
    }

    pub fn springs(&self) -> &[SpringState] {
        &self.springs
    }

    pub fn tick_count(&self) -> Tick {
        self.tick
    }

    /// Run one tick at wall-clock time `now`.
    pub fn tick(&mut self, frame: &LandmarkFrame, now: Seconds) -> SceneFrame {
        let elapsed = self
            .last_time
            .map_or(0.0, |last| (now - last).max(0.0)) as f32;
        self.last_time = Some(now);

        let sample = self.classifier.update(frame, now);
        let mut events = gesture_changes(&self.previous, &sample);
        self.previous = sample;

        events.extend(
            self.controller
                .update(&sample, now, &mut self.engine)
                .into_iter()
                .map(SceneEvent::from),
        );

        let completions = self.engine.advance(elapsed);
        events.extend(
            self.controller
                .apply_completions(&completions, &self.engine, now)
                .into_iter()
                .map(SceneEvent::from),
        );

        if let Some(strike) = self.strikes.update(&sample, now) {
            for spring in &mut self.springs {
                spring.trigger();
            }
            events.push(SceneEvent::StrikeTriggered {
                count: strike.count,
                source: strike.source,
            });
        }
        let spring_dt = elapsed.min(self.config.max_spring_dt);
        for spring in &mut self.springs {
            spring.step(spring_dt);
        }

        let frame = SceneFrame {
            tick: self.tick,
            time: now,
            sample,
            targets: self.controller.target_views(&self.engine),
            clouds: self.engine.jobs().iter().map(ParticleCloud::of).collect(),
            squash: self.springs.iter().map(SpringState::squash_stretch).collect(),
            ambient_angle: self.controller.ambient().angle,
            events,
        };
        self.tick += 1;

        trace!("Tick {} resolved with {} events", frame.tick, frame.events.len());
        for event in &frame.events {
            for listener in &mut self.listeners {
                listener.on_event(event);
            }
        }
        frame
    }
}

fn gesture_changes(previous: &GestureSample, current: &GestureSample) -> Vec<SceneEvent> {
    GestureKind::ALL
        .iter()
        .filter(|&&kind| previous.is_active(kind) != current.is_active(kind))
        .map(|&kind| SceneEvent::GestureChanged {
            gesture: kind,
            active: current.is_active(kind),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Pose, TargetId};
    use crate::interaction::TargetState;
    use crate::landmarks::synthetic::{frame_for, ScriptedPose};
    use crate::scene::EventLog;
    use glam::{Vec2, Vec3};

    const DT: f64 = 1.0 / 30.0;

    fn small_scene() -> Scene {
        let mut config = SceneConfig::default();
        config.transition.particle_count = 32;
        config.transition.seed = Some(1);
        let targets = vec![
            InteractionTarget::new(TargetId(0), Pose::at(Vec3::new(0.0, 1.0, 2.0))),
            InteractionTarget::new(TargetId(1), Pose::at(Vec3::new(0.0, 1.0, -2.0))),
        ];
        Scene::new(config, targets).unwrap()
    }

    fn pose_frame(pose: ScriptedPose) -> LandmarkFrame {
        frame_for(pose, Vec2::new(0.5, 0.8))
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let targets = vec![
            InteractionTarget::new(TargetId(4), Pose::default()),
            InteractionTarget::new(TargetId(4), Pose::default()),
        ];
        assert!(matches!(
            Scene::new(SceneConfig::default(), targets),
            Err(GiftError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = SceneConfig::default();
        config.transition.particle_count = 0;
        assert!(Scene::from_config(config).is_err());
    }

    #[test]
    fn test_fist_locks_and_reports() {
        let mut scene = small_scene();
        let log = EventLog::new();
        scene.add_listener(Box::new(log.clone()));

        let mut now = 0.0;
        for _ in 0..5 {
            scene.tick(&pose_frame(ScriptedPose::Open), now);
            now += DT;
        }
        let frame = scene.tick(&pose_frame(ScriptedPose::Fist), now);
        assert!(frame.sample.is_grabbing);
        assert!(frame.events.contains(&SceneEvent::Locked { target: TargetId(0) }));
        assert!(frame.events.contains(&SceneEvent::GestureChanged {
            gesture: GestureKind::Grab,
            active: true
        }));
        assert_eq!(frame.targets[0].state, TargetState::Locked);
        assert_eq!(log.count(|e| matches!(e, SceneEvent::Locked { .. })), 1);
    }

    #[test]
    fn test_full_cycle_returns_to_rest() {
        let mut scene = small_scene();
        let mut now = 0.0;
        scene.tick(&pose_frame(ScriptedPose::Fist), now);
        // hold past the minimum display time, then open
        while now < 2.0 {
            now += DT;
            scene.tick(&pose_frame(ScriptedPose::Fist), now);
        }
        let mut completed = false;
        for _ in 0..400 {
            now += DT;
            let frame = scene.tick(&pose_frame(ScriptedPose::Open), now);
            if frame.events.contains(&SceneEvent::TransitionCompleted { target: TargetId(0) }) {
                completed = true;
                break;
            }
            if !frame.clouds.is_empty() {
                assert_eq!(frame.clouds[0].positions.len(), 32);
            }
        }
        assert!(completed);
        let target = scene.controller().target(TargetId(0)).unwrap();
        assert_eq!(target.pose, target.rest_pose);
        assert_eq!(scene.engine().active_count(), 0);
    }

    #[test]
    fn test_frame_json_carries_render_output() {
        let mut scene = small_scene();
        let mut now = 0.0;
        while now < 2.0 {
            scene.tick(&pose_frame(ScriptedPose::Fist), now);
            now += DT;
        }
        scene.tick(&pose_frame(ScriptedPose::Open), now);
        let frame = scene.tick(&pose_frame(ScriptedPose::Open), now + DT);
        assert_eq!(frame.clouds.len(), 1);

        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["targets"].as_array().unwrap().len(), 2);
        assert_eq!(json["targets"][0]["state"], "dissolving");
        assert_eq!(json["targets"][0]["pose"]["position"].as_array().unwrap().len(), 3);
        assert_eq!(json["clouds"][0]["positions"].as_array().unwrap().len(), 32);
        assert!(json["clouds"][0]["pose"]["orientation"].is_array());
        assert_eq!(json["sample"]["velocity"].as_array().unwrap().len(), 2);

        let cloud = &frame.clouds[0];
        let first = cloud.world_positions().next().unwrap();
        assert_eq!(first, cloud.positions[0] + cloud.pose.position);
    }

    #[test]
    fn test_strike_fires_all_springs() {
        let mut config = SceneConfig::preset("wooden_fish").unwrap();
        config.strike.downward_velocity = -0.5;
        let mut scene = Scene::from_config(config).unwrap();
        assert_eq!(scene.springs().len(), 2);

        // wrist dropping fast down the image reads as a downward swing
        let mut now = 0.0;
        let mut strikes = 0;
        for i in 0..20 {
            let wrist = Vec2::new(0.5, 0.2 + i as f32 * 0.04);
            let frame = scene.tick(&frame_for(ScriptedPose::Open, wrist), now);
            strikes += frame
                .events
                .iter()
                .filter(|e| matches!(e, SceneEvent::StrikeTriggered { .. }))
                .count();
            now += DT;
        }
        assert!(strikes >= 1);
        assert!(scene.springs().iter().all(|s| !s.is_settled(1e-4)));
    }

    #[test]
    fn test_spring_dt_clamped() {
        let mut scene = Scene::from_config(SceneConfig::preset("wooden_fish").unwrap()).unwrap();
        let first = scene.tick(&pose_frame(ScriptedPose::Prayer), 0.0);
        assert!(first
            .events
            .iter()
            .any(|e| matches!(e, SceneEvent::StrikeTriggered { count: 1, .. })));

        // a stalled ten-second frame integrates as a single 0.05 s step
        let frame = scene.tick(&LandmarkFrame::empty(), 10.0);
        assert!((frame.squash[0].vertical - 0.55).abs() < 1e-4);
        assert!((frame.squash[1].vertical - 0.612).abs() < 1e-4);
        assert_eq!(frame.tick, 1);
    }

    #[test]
    fn test_tracking_loss_clears_grab() {
        let mut scene = small_scene();
        scene.tick(&pose_frame(ScriptedPose::Fist), 0.0);
        let frame = scene.tick(&LandmarkFrame::empty(), DT);
        assert!(!frame.sample.is_grabbing);
        assert!(frame.events.contains(&SceneEvent::GestureChanged {
            gesture: GestureKind::Grab,
            active: false
        }));
    }
}
