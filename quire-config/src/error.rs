// Configuration errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// Dotted key with no value behind it
    #[error("no configuration value at '{0}'")]
    KeyNotFound(String),

    #[error("cannot read {path}: {reason}")]
    Load { path: String, reason: String },

    #[error("invalid {format} configuration: {reason}")]
    Parse { format: &'static str, reason: String },

    /// A source that must be a table of settings was something else
    #[error("{0} must be an object of settings")]
    NotATable(String),

    #[error("invalid setting: {0}")]
    Validation(String),

    #[error("cannot convert setting '{key}': {reason}")]
    Convert { key: String, reason: String },

    #[error("environment: {0}")]
    Env(#[from] std::env::VarError),
}

impl ConfigError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
