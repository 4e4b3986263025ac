//! Selection lifecycle: grab selects the front-most target, release after a
//! minimum display time dissolves it back home, then a cooldown gates the
//! next grab.
//!
//! ```text
//!   IDLE ──grab edge──▶ CANDIDATE ──confirmed──▶ LOCKED
//!    ▲                     │                       │ release after min display
//!    │◀──grab dropped──────┘                       ▼
//!    └──────────── transition complete ───── DISSOLVING
//! ```

use std::cmp::Reverse;

use ahash::AHashMap;
use ordered_float::OrderedFloat;
use tracing::{debug, info, warn};

use crate::core::error::{GiftError, Result};
use crate::core::types::{Seconds, TargetId};
use crate::gesture::GestureSample;
use crate::transition::{TransitionCompletion, TransitionEngine};

use super::events::InteractionEvent;
use super::session::{AmbientMotion, InteractionConfig, InteractionSession};
use super::target::{InteractionTarget, TargetState, TargetView};

pub struct InteractionController {
    config: InteractionConfig,
    targets: Vec<InteractionTarget>,
    index: AHashMap<TargetId, usize>,
    session: InteractionSession,
    ambient: AmbientMotion,
    was_grabbing: bool,
    /// A grab edge not yet spent on a selection. Survives blocked ticks
    /// while the fist stays closed; opening the hand disarms it.
    grab_armed: bool,
    cooldown_pending: bool,
}

impl InteractionController {
    pub fn new(config: InteractionConfig, targets: Vec<InteractionTarget>) -> Self {
        let index = targets
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id, i))
            .collect();
        Self {
            session: InteractionSession::new(&config),
            ambient: AmbientMotion::new(&config),
            config,
            targets,
            index,
            was_grabbing: false,
            grab_armed: false,
            cooldown_pending: false,
        }
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    pub fn session(&self) -> &InteractionSession {
        &self.session
    }

    pub fn targets(&self) -> &[InteractionTarget] {
        &self.targets
    }

    pub fn target(&self, id: TargetId) -> Option<&InteractionTarget> {
        self.index.get(&id).map(|&i| &self.targets[i])
    }

    pub fn ambient(&self) -> &AmbientMotion {
        &self.ambient
    }

    /// Targets currently holding the active slot. Never more than one.
    pub fn active_count(&self) -> usize {
        self.targets
            .iter()
            .filter(|t| t.state.holds_active_slot())
            .count()
    }

    fn any_dissolving(&self) -> bool {
        self.targets
            .iter()
            .any(|t| t.state == TargetState::Dissolving)
    }

    /// Ambient rotation runs only while nothing is highlighted or dissolving.
    pub fn ambient_active(&self) -> bool {
        self.session.highlighted.is_none() && !self.any_dissolving()
    }

    /// Idle target nearest the viewer. Ties go to the earliest target.
    fn front_most_idle(&self) -> Option<usize> {
        self.targets
            .iter()
            .enumerate()
            .filter(|(_, t)| t.state == TargetState::Idle)
            .map(|(i, t)| (i, self.ambient.depth_of(t.rest_pose.position)))
            .filter(|(_, depth)| depth.is_finite())
            .min_by_key(|&(_, depth)| Reverse(OrderedFloat(depth)))
            .map(|(i, _)| i)
    }

    /// Advance the lifecycle by one tick.
    ///
    /// Emits at most one event of each kind. Dissolve jobs are spawned on
    /// `engine`; completions come back through [`Self::apply_completions`].
    pub fn update(
        &mut self,
        sample: &GestureSample,
        now: Seconds,
        engine: &mut TransitionEngine,
    ) -> Vec<InteractionEvent> {
        let mut events = Vec::new();

        if self.cooldown_pending && !self.session.in_cooldown(now) {
            self.cooldown_pending = false;
            debug!("Cooldown ended at {:.3}", now);
            events.push(InteractionEvent::CooldownEnded);
        }

        let grabbing = sample.hand_present && sample.is_grabbing;
        if grabbing && !self.was_grabbing {
            self.grab_armed = true;
        } else if !grabbing {
            self.grab_armed = false;
        }
        self.was_grabbing = grabbing;

        if self.session.highlighted.is_none()
            && self.grab_armed
            && !self.session.in_cooldown(now)
            && !self.any_dissolving()
        {
            if let Some(i) = self.front_most_idle() {
                self.grab_armed = false;
                let target = &mut self.targets[i];
                target.state = TargetState::Candidate;
                target.candidate_since = Some(now);
                self.session.highlighted = Some(target.id);
                debug!("Target {:?} is candidate", target.id);
                events.push(InteractionEvent::SelectionChanged {
                    target: Some(target.id),
                });
            }
        }

        if let Some(id) = self.session.highlighted {
            if let Some(&i) = self.index.get(&id) {
                self.step_highlighted(i, grabbing, now, engine, &mut events);
            }
        }

        if self.ambient_active() {
            self.ambient.advance(sample.velocity.x);
        }

        events
    }

    fn step_highlighted(
        &mut self,
        i: usize,
        grabbing: bool,
        now: Seconds,
        engine: &mut TransitionEngine,
        events: &mut Vec<InteractionEvent>,
    ) {
        let focus = self.ambient.focus_pose(&self.config);
        let target = &mut self.targets[i];
        match target.state {
            TargetState::Candidate if !grabbing => {
                debug!("Candidate {:?} dropped before confirmation", target.id);
                target.reset();
                self.session.highlighted = None;
                events.push(InteractionEvent::SelectionChanged { target: None });
            }
            TargetState::Candidate => {
                let since = target.candidate_since.unwrap_or(now);
                if now - since >= self.config.candidate_confirm_duration {
                    target.state = TargetState::Locked;
                    target.lock_start_time = Some(now);
                    target.pose = focus;
                    info!("Locked target {:?} at {:.3}", target.id, now);
                    events.push(InteractionEvent::Locked { target: target.id });
                }
            }
            TargetState::Locked if !grabbing => {
                let held = now - target.lock_start_time.unwrap_or(now);
                if held >= self.session.min_display_duration {
                    target.state = TargetState::Dissolving;
                    let job = engine.spawn(target.id, target.pose, target.rest_pose, now);
                    info!(
                        "Released target {:?} after {:.3}s, dissolving as {:?}",
                        target.id, held, job
                    );
                    self.session.highlighted = None;
                    events.push(InteractionEvent::Released {
                        target: target.id,
                        job,
                    });
                    events.push(InteractionEvent::SelectionChanged { target: None });
                }
            }
            _ => {}
        }
    }

    /// Finish the dissolve of `target`: exact rest pose, IDLE, and start the
    /// cooldown. Returns `None` if the target was not dissolving.
    pub fn complete_transition(
        &mut self,
        target: TargetId,
        now: Seconds,
    ) -> Result<Option<InteractionEvent>> {
        let &i = self
            .index
            .get(&target)
            .ok_or(GiftError::UnknownTarget(target))?;
        let t = &mut self.targets[i];
        if t.state != TargetState::Dissolving {
            return Ok(None);
        }
        t.reset();
        self.session.cooldown_end_time = now + self.session.cooldown_duration;
        self.cooldown_pending = true;
        info!(
            "Target {:?} back at rest, cooldown until {:.3}",
            target, self.session.cooldown_end_time
        );
        Ok(Some(InteractionEvent::TransitionCompleted { target }))
    }

    /// Fold an engine step back into target state: completed jobs finish
    /// their targets, running jobs drive the presented pose.
    pub fn apply_completions(
        &mut self,
        completions: &[TransitionCompletion],
        engine: &TransitionEngine,
        now: Seconds,
    ) -> Vec<InteractionEvent> {
        let mut events = Vec::new();
        for completion in completions {
            match self.complete_transition(completion.target, now) {
                Ok(Some(event)) => events.push(event),
                Ok(None) => {}
                Err(e) => warn!("Dropping completion of {:?}: {}", completion.job, e),
            }
        }
        for target in &mut self.targets {
            if target.state == TargetState::Dissolving {
                if let Some(job) = engine.job_for(target.id) {
                    target.pose = job.current_pose();
                }
            }
        }
        events
    }

    pub fn target_views(&self, engine: &TransitionEngine) -> Vec<TargetView> {
        self.targets
            .iter()
            .map(|t| TargetView {
                id: t.id,
                state: t.state,
                pose: t.pose,
                progress: (t.state == TargetState::Dissolving)
                    .then(|| engine.job_for(t.id).map(|job| job.progress()))
                    .flatten(),
            })
            .collect()
    }
}
