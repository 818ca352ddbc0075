//! Core error types for deepwork-core.
//!
//! Every error is returned synchronously from the offending call and is
//! non-fatal: the presentation layer reports it and prompts for correction.

use std::path::PathBuf;
use thiserror::Error;

use crate::session::SessionPhase;
use crate::task::TaskId;

/// Core error type for deepwork-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Malformed command input
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Operation referenced a task id the store does not know
    #[error("Task {id} not found")]
    NotFound { id: TaskId },

    /// A session is already active
    #[error("A session is already active for task {active}")]
    Conflict { active: TaskId },

    /// Phase-specific operation called outside its phase
    #[error("Cannot {operation} while the session is {phase}")]
    InvalidTransition {
        operation: &'static str,
        phase: SessionPhase,
    },

    /// Accept/dismiss with no outstanding nudge
    #[error("No pending nudge")]
    NoPendingNudge,

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field was empty
    #[error("'{field}' must not be empty")]
    EmptyField { field: &'static str },

    /// Task listed itself as a dependency
    #[error("Task {id} cannot depend on itself")]
    SelfDependency { id: TaskId },

    /// Session requested for a task whose dependencies are not done
    #[error("Task {id} is not eligible to start")]
    NotEligible { id: TaskId },

    /// Counter would go backwards
    #[error("Counter '{counter}' cannot decrease from {current} to {requested}")]
    CounterDecrease {
        counter: &'static str,
        current: u32,
        requested: u32,
    },

    /// Duration outside the creation interface's soft bounds
    #[error("Duration {minutes} min is outside {min}..={max} min")]
    DurationOutOfRange { minutes: u32, min: u32, max: u32 },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
