//! Error types for Ember

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Ember operations
#[derive(Debug, Error)]
pub enum EmberError {
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Duplicate entity name: {0}")]
    DuplicateEntityName(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),

    #[error("Scene error: {0}")]
    SceneError(String),

    #[error("Temp snapshot does not exist: {}", .0.display())]
    MissingSnapshot(PathBuf),

    #[error("Invalid transition: cannot apply {event} while {from}")]
    InvalidTransition { from: String, event: String },

    #[error("Subsystem already registered: {0}")]
    DuplicateSubsystem(String),

    #[error("Config error: {0}")]
    ConfigError(String),
}

/// Result type alias for Ember operations
pub type Result<T> = std::result::Result<T, EmberError>;

impl From<toml::de::Error> for EmberError {
    fn from(err: toml::de::Error) -> Self {
        EmberError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for EmberError {
    fn from(err: toml::ser::Error) -> Self {
        EmberError::TomlSerError(err.to_string())
    }
}
