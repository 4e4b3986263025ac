use thiserror::Error;

use crate::core::types::TargetId;

#[derive(Error, Debug)]
pub enum GiftError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Unknown scene preset: {0}")]
    UnknownPreset(String),

    #[error("Unknown target: {0:?}")]
    UnknownTarget(TargetId),
}

pub type Result<T> = std::result::Result<T, GiftError>;
