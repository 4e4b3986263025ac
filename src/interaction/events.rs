use serde::Serialize;

use crate::core::types::{JobId, TargetId};

/// Lifecycle notifications from the interaction controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InteractionEvent {
    /// The highlighted slot changed. `None` means nothing is highlighted.
    SelectionChanged { target: Option<TargetId> },
    Locked { target: TargetId },
    /// Release honoured; the dissolve job has been spawned.
    Released { target: TargetId, job: JobId },
    TransitionCompleted { target: TargetId },
    CooldownEnded,
}
