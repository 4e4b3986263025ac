//! Interaction lifecycle integration tests
//!
//! Scenario tests through the full scene pipeline, plus properties that
//! must hold for any grab/release sequence.

use giftcard_gestures::core::{Pose, SceneConfig, TargetId};
use giftcard_gestures::gesture::GestureSample;
use giftcard_gestures::interaction::{
    InteractionConfig, InteractionController, InteractionEvent, InteractionTarget, TargetState,
};
use giftcard_gestures::landmarks::synthetic::{frame_for, ScriptedPose};
use giftcard_gestures::landmarks::{LandmarkSource, ScriptedSource};
use giftcard_gestures::scene::{EventLog, Scene, SceneEvent};
use giftcard_gestures::transition::{TransitionConfig, TransitionEngine};
use glam::{Quat, Vec2, Vec3};
use proptest::prelude::*;

const WRIST: Vec2 = Vec2::new(0.5, 0.8);
const FPS: f64 = 60.0;

fn quick_config() -> SceneConfig {
    let mut config = SceneConfig::default();
    config.layout.count = 6;
    config.transition.particle_count = 24;
    config.transition.seed = Some(11);
    config
}

fn run(scene: &mut Scene, pose: ScriptedPose, from: f64, until: f64) -> f64 {
    let mut now = from;
    while now < until {
        scene.tick(&frame_for(pose, WRIST), now);
        now += 1.0 / FPS;
    }
    now
}

#[test]
fn test_short_grab_is_held_for_minimum_display() {
    let mut scene = Scene::from_config(quick_config()).unwrap();
    let log = EventLog::new();
    scene.add_listener(Box::new(log.clone()));

    // grab at 0, release at 0.3 s
    let now = run(&mut scene, ScriptedPose::Fist, 0.0, 0.3);
    let now = run(&mut scene, ScriptedPose::Open, now, 1.45);
    assert_eq!(log.count(|e| matches!(e, SceneEvent::Locked { .. })), 1);
    assert_eq!(log.count(|e| matches!(e, SceneEvent::Released { .. })), 0);

    run(&mut scene, ScriptedPose::Open, now, 1.6);
    assert_eq!(log.count(|e| matches!(e, SceneEvent::Released { .. })), 1);
    let dissolving = scene
        .controller()
        .targets()
        .iter()
        .filter(|t| t.state == TargetState::Dissolving)
        .count();
    assert_eq!(dissolving, 1);
}

#[test]
fn test_long_hold_releases_on_open() {
    let mut scene = Scene::from_config(quick_config()).unwrap();
    let now = run(&mut scene, ScriptedPose::Fist, 0.0, 2.0);
    assert!(scene.controller().session().highlighted.is_some());

    let frame = scene.tick(&frame_for(ScriptedPose::Open, WRIST), now);
    assert!(frame
        .events
        .iter()
        .any(|e| matches!(e, SceneEvent::Released { .. })));
    assert_eq!(scene.controller().session().highlighted, None);
    assert_eq!(frame.clouds.len(), 1);
}

#[test]
fn test_grab_during_cooldown_is_ignored() {
    let mut scene = Scene::from_config(quick_config()).unwrap();
    let log = EventLog::new();
    scene.add_listener(Box::new(log.clone()));

    let mut now = run(&mut scene, ScriptedPose::Fist, 0.0, 2.0);
    // open until the dissolve completes
    while log.count(|e| matches!(e, SceneEvent::TransitionCompleted { .. })) == 0 {
        scene.tick(&frame_for(ScriptedPose::Open, WRIST), now);
        now += 1.0 / FPS;
        assert!(now < 10.0, "dissolve never completed");
    }
    let completed_at = now;

    // fresh grab 0.2 s into the 0.8 s cooldown
    let now = run(&mut scene, ScriptedPose::Open, now, completed_at + 0.2);
    let now = run(&mut scene, ScriptedPose::Fist, now, completed_at + 0.5);
    assert_eq!(log.count(|e| matches!(e, SceneEvent::Locked { .. })), 1);

    // after the cooldown a new grab edge locks again
    let now = run(&mut scene, ScriptedPose::Open, now, completed_at + 1.0);
    run(&mut scene, ScriptedPose::Fist, now, completed_at + 1.2);
    assert_eq!(log.count(|e| matches!(e, SceneEvent::CooldownEnded)), 1);
    assert_eq!(log.count(|e| matches!(e, SceneEvent::Locked { .. })), 2);
}

#[test]
fn test_scripted_demo_cycles() {
    let mut scene = Scene::from_config(quick_config()).unwrap();
    let log = EventLog::new();
    scene.add_listener(Box::new(log.clone()));

    let mut source = ScriptedSource::grab_release_demo(2);
    let ticks = (source.duration() * FPS) as u64;
    for tick in 0..ticks {
        let now = tick as f64 / FPS;
        let frame = source.poll(now);
        scene.tick(&frame, now);
        assert!(scene.controller().active_count() <= 1);
    }
    assert_eq!(log.count(|e| matches!(e, SceneEvent::Locked { .. })), 2);
    assert_eq!(log.count(|e| matches!(e, SceneEvent::TransitionCompleted { .. })), 2);
    for target in scene.controller().targets() {
        assert_eq!(target.state, TargetState::Idle);
        assert_eq!(target.pose, target.rest_pose);
    }
}

#[test]
fn test_treasure_requires_held_grab() {
    let mut config = SceneConfig::preset("treasure").unwrap();
    config.transition.particle_count = 8;
    let mut scene = Scene::from_config(config).unwrap();

    // a 0.1 s brush of the fist selects then drops the candidate
    let now = run(&mut scene, ScriptedPose::Fist, 0.0, 0.1);
    assert_eq!(scene.controller().active_count(), 0);
    let now = run(&mut scene, ScriptedPose::Open, now, 0.3);
    assert_eq!(scene.controller().session().highlighted, None);

    run(&mut scene, ScriptedPose::Fist, now, 0.8);
    assert_eq!(scene.controller().active_count(), 1);
}

fn sample(grabbing: bool) -> GestureSample {
    GestureSample {
        hand_present: true,
        is_grabbing: grabbing,
        ..GestureSample::default()
    }
}

fn pool(positions: &[(f32, f32, f32)]) -> Vec<InteractionTarget> {
    positions
        .iter()
        .enumerate()
        .map(|(i, &(x, y, z))| {
            let rest = Pose::new(Vec3::new(x, y, z), Quat::from_rotation_y(x + z));
            InteractionTarget::new(TargetId(i as u32), rest)
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// For any grab pattern: at most one target is active, releases honour
    /// the minimum display time, no lock lands inside a cooldown, and every
    /// finished target is back at its exact rest pose.
    #[test]
    fn prop_lifecycle_invariants(
        positions in prop::collection::vec((-5.0f32..5.0, 0.0f32..10.0, -5.0f32..5.0), 1..6),
        script in prop::collection::vec((any::<bool>(), 1usize..40), 1..30),
    ) {
        let config = InteractionConfig::default();
        let mut controller = InteractionController::new(config.clone(), pool(&positions));
        let mut engine = TransitionEngine::new(TransitionConfig {
            particle_count: 4,
            progress_step: 0.05,
            seed: Some(3),
            ..TransitionConfig::default()
        });
        let dt = 1.0 / 30.0;
        let mut now = 0.0;
        let mut lock_times = std::collections::HashMap::new();

        for (grabbing, ticks) in script {
            for _ in 0..ticks {
                let cooldown_end = controller.session().cooldown_end_time;
                let events = controller.update(&sample(grabbing), now, &mut engine);
                for event in &events {
                    match *event {
                        InteractionEvent::Locked { target } => {
                            prop_assert!(now >= cooldown_end);
                            lock_times.insert(target, now);
                        }
                        InteractionEvent::Released { target, .. } => {
                            let locked = lock_times[&target];
                            prop_assert!(now - locked >= config.min_display_duration);
                        }
                        _ => {}
                    }
                }
                let done = engine.advance(dt as f32);
                for event in controller.apply_completions(&done, &engine, now) {
                    if let InteractionEvent::TransitionCompleted { target } = event {
                        let t = controller.target(target).unwrap();
                        prop_assert_eq!(t.pose, t.rest_pose);
                        prop_assert_eq!(t.state, TargetState::Idle);
                    }
                }
                prop_assert!(controller.active_count() <= 1);
                prop_assert!(engine.active_count() <= 1);
                now += dt;
            }
        }
    }
}
