//! Core error types for blockplan-core.
//!
//! Only structural contract violations and configuration problems are
//! errors. Lines that fail to parse and items that cannot be placed are
//! reported as data inside a `ScheduleResult`, never through these types.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for blockplan-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
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

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Dot-path key that does not exist in the configuration
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Configuration file that is not valid TOML for this schema
    #[error("Failed to parse configuration {path}: {message}")]
    ParseFailed { path: PathBuf, message: String },
}

/// Validation errors.
///
/// Raised when a caller hands the engine structurally impossible input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Interval outside the day or with a non-positive length
    #[error("Invalid interval: {start}..{end} must satisfy 0 <= start < end <= 1440")]
    InvalidInterval { start: u32, end: u32 },

    /// Working-day boundary with start >= end or end past midnight
    #[error("Invalid working day: {start}..{end} must satisfy start < end <= 1440")]
    InvalidWorkingDay { start: u32, end: u32 },

    /// Plan item whose fields contradict its kind
    #[error("Invalid plan item '{label}': {message}")]
    InvalidPlanItem { label: String, message: String },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
