//! Scene events and listeners

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use tracing::debug;

use crate::core::types::{JobId, TargetId};
use crate::feedback::StrikeSource;
use crate::gesture::GestureKind;
use crate::interaction::InteractionEvent;

/// Everything observable that happened during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SceneEvent {
    SelectionChanged { target: Option<TargetId> },
    Locked { target: TargetId },
    Released { target: TargetId, job: JobId },
    TransitionCompleted { target: TargetId },
    CooldownEnded,
    StrikeTriggered { count: u64, source: StrikeSource },
    GestureChanged { gesture: GestureKind, active: bool },
}

impl From<InteractionEvent> for SceneEvent {
    fn from(event: InteractionEvent) -> Self {
        match event {
            InteractionEvent::SelectionChanged { target } => SceneEvent::SelectionChanged { target },
            InteractionEvent::Locked { target } => SceneEvent::Locked { target },
            InteractionEvent::Released { target, job } => SceneEvent::Released { target, job },
            InteractionEvent::TransitionCompleted { target } => {
                SceneEvent::TransitionCompleted { target }
            }
            InteractionEvent::CooldownEnded => SceneEvent::CooldownEnded,
        }
    }
}

/// Observer notified after each tick has fully resolved.
pub trait EventListener {
    fn on_event(&mut self, event: &SceneEvent);
}

/// Collects every event. Clones share the same buffer, so a handle kept
/// outside the scene sees what the scene's copy recorded.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<SceneEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SceneEvent> {
        self.events.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    pub fn count(&self, pred: impl Fn(&SceneEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl EventListener for EventLog {
    fn on_event(&mut self, event: &SceneEvent) {
        self.events.borrow_mut().push(*event);
    }
}

/// Forwards events to `tracing` at debug level.
pub struct TracingListener;

impl EventListener for TracingListener {
    fn on_event(&mut self, event: &SceneEvent) {
        debug!(?event, "scene event");
    }
}
