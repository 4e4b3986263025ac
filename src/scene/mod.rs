//! Scene pipeline: one tick from landmarks to a render snapshot.

pub mod events;
pub mod frame;
pub mod tick;

pub use events::{EventListener, EventLog, SceneEvent, TracingListener};
pub use frame::{ParticleCloud, SceneFrame};
pub use tick::Scene;
