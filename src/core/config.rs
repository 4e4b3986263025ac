//! Scene configuration with documented constants
//!
//! Every tunable of the pipeline lives here, grouped by the component that
//! consumes it. Presets reproduce the interaction scenes the core was built
//! for; files under `data/scenes/` can override any field.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::error::{GiftError, Result};
use crate::feedback::{SpringConfig, StrikeConfig};
use crate::gesture::GestureConfig;
use crate::interaction::{InteractionConfig, SpiralLayout};
use crate::transition::TransitionConfig;

/// Names accepted by [`SceneConfig::preset`].
pub const PRESET_NAMES: [&str; 5] = [
    "photo_tree",
    "wooden_fish",
    "fireworks",
    "birthday_cake",
    "treasure",
];

/// Configuration for one interaction scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub name: String,

    // === TARGETS ===
    /// Rest placement of the selectable targets. A count of zero gives a
    /// scene driven purely by gestures and strikes.
    pub layout: SpiralLayout,

    // === PIPELINE STAGES ===
    pub gesture: GestureConfig,
    pub interaction: InteractionConfig,
    pub transition: TransitionConfig,

    // === IMPACT FEEDBACK ===
    /// One spring per deforming part. All of them fire on every strike.
    pub springs: Vec<SpringConfig>,
    pub strike: StrikeConfig,

    /// Upper bound on the spring integration step (seconds)
    ///
    /// A stalled frame would otherwise hand the spring a huge dt and blow
    /// the semi-implicit integration up.
    pub max_spring_dt: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            name: "photo_tree".into(),
            layout: SpiralLayout::default(),
            gesture: GestureConfig::default(),
            interaction: InteractionConfig::default(),
            transition: TransitionConfig::default(),
            springs: Vec::new(),
            strike: StrikeConfig::default(),
            max_spring_dt: 0.05,
        }
    }
}

impl SceneConfig {
    /// Built-in presets. Does not touch the file system.
    pub fn preset(name: &str) -> Result<Self> {
        let base = SceneConfig {
            name: name.to_string(),
            ..SceneConfig::default()
        };
        let config = match name {
            "photo_tree" => base,
            "wooden_fish" => SceneConfig {
                layout: SpiralLayout {
                    count: 0,
                    ..SpiralLayout::default()
                },
                springs: vec![SpringConfig::default(), SpringConfig::wobble()],
                strike: StrikeConfig {
                    enabled: true,
                    ..StrikeConfig::default()
                },
                ..base
            },
            "fireworks" => SceneConfig {
                layout: SpiralLayout {
                    count: 0,
                    ..SpiralLayout::default()
                },
                transition: TransitionConfig {
                    particle_count: 1200,
                    ..TransitionConfig::default()
                },
                ..base
            },
            "birthday_cake" => SceneConfig {
                layout: SpiralLayout {
                    count: 0,
                    ..SpiralLayout::default()
                },
                transition: TransitionConfig {
                    particle_count: 1500,
                    ..TransitionConfig::default()
                },
                ..base
            },
            "treasure" => SceneConfig {
                layout: SpiralLayout {
                    count: 8,
                    height: 4.0,
                    base_radius: 5.0,
                    apex_radius: 5.0,
                    angle_step: std::f32::consts::TAU / 8.0,
                },
                interaction: InteractionConfig {
                    candidate_confirm_duration: 0.3,
                    min_display_duration: 1.0,
                    ..InteractionConfig::default()
                },
                ..base
            },
            _ => return Err(GiftError::UnknownPreset(name.to_string())),
        };
        Ok(config)
    }

    /// Validate configuration values are internally consistent
    pub fn validate(&self) -> Result<()> {
        self.check().map_err(GiftError::InvalidConfig)
    }

    fn check(&self) -> std::result::Result<(), String> {
        self.gesture.validate()?;
        self.interaction.validate()?;
        self.transition.validate()?;
        self.strike.validate()?;
        for spring in &self.springs {
            spring.validate()?;
        }
        if !(self.max_spring_dt > 0.0) {
            return Err(format!(
                "max_spring_dt ({}) must be positive",
                self.max_spring_dt
            ));
        }
        Ok(())
    }
}

/// Load a scene from a TOML file. Missing fields take their defaults.
pub fn load_scene_config(path: impl AsRef<Path>) -> Result<SceneConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let config: SceneConfig = toml::from_str(&contents)
        .map_err(|e| GiftError::ConfigParse(format!("{}: {}", path.display(), e)))?;
    config.validate()?;
    info!("Loaded scene '{}' from {}", config.name, path.display());
    Ok(config)
}

/// Load `data/scenes/{name}.toml`, falling back to the built-in preset when
/// no file exists.
pub fn load_scene_preset(name: &str) -> Result<SceneConfig> {
    let path = preset_path(name);
    if !path.exists() {
        let config = SceneConfig::preset(name)?;
        info!("Using built-in scene '{}'", name);
        return Ok(config);
    }
    let mut config = load_scene_config(&path)?;
    config.name = name.to_string();
    Ok(config)
}

fn preset_path(name: &str) -> PathBuf {
    PathBuf::from("data/scenes").join(format!("{}.toml", name))
}
