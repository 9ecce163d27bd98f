//! Core error types for cuetimer-core.
//!
//! The countdown itself has no runtime failure paths. Errors only arise when
//! a configuration is built or loaded, and when a host capability rejects a
//! side effect (those never reach the state machine).

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for cuetimer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
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

    /// Config directory could not be determined
    #[error("Cannot determine configuration directory")]
    NoConfigDir,

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Timer parameter validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// `total_secs` must be strictly positive
    #[error("Invalid total duration: {0} seconds (must be > 0)")]
    InvalidTotal(u64),

    /// `ticks_per_second` must be at least 1
    #[error("Invalid ticks per second: {0} (must be >= 1)")]
    InvalidTicksPerSecond(u64),

    /// Preset key is not in the preset table
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    /// Text that does not name a timer state
    #[error("Unknown timer state '{0}' (expected started, paused or reset)")]
    UnknownState(String),
}

/// Failure reported by a host capability (speech, audio, wake lock).
///
/// These are logged at the dispatch boundary and never propagated into the
/// countdown.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The capability does not exist on this host
    #[error("{0} is not available on this host")]
    Unavailable(&'static str),

    /// The host refused or failed to perform the effect
    #[error("{capability} rejected the request: {message}")]
    Rejected {
        capability: &'static str,
        message: String,
    },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
