//! Error types for the Powerpipe command bootstrap.

use thiserror::Error;

/// Errors raised while the command tree is being constructed.
///
/// These are defects in the tree itself, never user input, and abort
/// initialization before any command runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("Invalid command name: {0:?}")]
    InvalidName(String),

    #[error("Duplicate command name '{name}' under '{parent}'")]
    DuplicateName { parent: String, name: String },

    #[error("Duplicate flag '--{flag}' on command '{command}'")]
    DuplicateFlag { command: String, flag: String },

    #[error("Configuration key '{0}' is already bound")]
    DuplicateBinding(String),
}

/// Errors raised while resolving and running a command for one invocation.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unknown command {token:?} for {path:?}")]
    UnknownCommand { path: String, token: String },

    #[error("{0}")]
    MalformedFlag(String),

    #[error("invalid value {value:?} for '{key}': {reason}")]
    InvalidConfigValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Command(#[from] anyhow::Error),
}

/// Errors raised while loading configuration layers.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Load(String),

    #[error("Logging configuration error: {0}")]
    Logging(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::Load(err.to_string())
    }
}

/// Failure with an explicit exit code, returned by subcommands that need a
/// specific non-zero status.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CommandFailure {
    pub code: i32,
    pub message: String,
}

impl CommandFailure {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}
