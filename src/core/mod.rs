pub mod config;
pub mod error;
pub mod types;

pub use config::{load_scene_config, load_scene_preset, SceneConfig};
pub use error::{GiftError, Result};
pub use types::{JobId, Pose, Seconds, TargetId, Tick};
