use thiserror::Error;

use crate::pipeline::validate::ValidationError;

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("raw payload is not a JSON object")]
    MalformedPayload,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, NormalizeError>;
