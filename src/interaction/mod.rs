//! Target selection, lock, release and cooldown.

pub mod controller;
pub mod events;
pub mod layout;
pub mod session;
pub mod target;

pub use controller::InteractionController;
pub use events::InteractionEvent;
pub use layout::SpiralLayout;
pub use session::{AmbientMotion, InteractionConfig, InteractionSession};
pub use target::{InteractionTarget, TargetState, TargetView};
