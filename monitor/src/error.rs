//! Error handling for the MCP observability monitor
//!
//! Every step of a monitoring tick can fail independently (reading a daily
//! metrics file, writing the snapshot, sweeping old files). These types let the
//! service log the failure, record it, and move on to the next step.

use std::io;

use thiserror::Error;

/// The main error type for the monitor
#[derive(Error, Debug)]
pub enum MonitorError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Persistence related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Lifecycle errors (starting twice, ticking after shutdown)
    #[error("Lifecycle error: {0}")]
    Lifecycle(String),

    /// Generic errors
    #[error("{0}")]
    Generic(String),
}

/// Persistence related errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Directory creation failed: {path}")]
    DirectoryCreationFailed { path: String },

    #[error("Corrupted log file {path}: {reason}")]
    CorruptedFile { path: String, reason: String },

    #[error("Write failed for {path}: {reason}")]
    WriteFailed { path: String, reason: String },
}

/// Configuration related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid configuration value: {field} = {value}")]
    InvalidValue { field: String, value: String },

    #[error("Configuration validation failed: {reason}")]
    ValidationFailed { reason: String },

    #[error("Configuration parsing error: {reason}")]
    ParseError { reason: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError { reason: err.to_string() }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, MonitorError>;

/// A specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// A specialized result type for persistence operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

impl MonitorError {
    /// Filesystem and serialization problems are skipped for the current tick;
    /// configuration and lifecycle problems stop the process.
    pub fn is_recoverable(&self) -> bool {
        match self {
            MonitorError::Config(_) => false,
            MonitorError::Lifecycle(_) => false,
            MonitorError::Storage(StorageError::DirectoryCreationFailed { .. }) => false,
            _ => true,
        }
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            MonitorError::Config(_) => "config",
            MonitorError::Storage(_) => "storage",
            MonitorError::Io(_) => "io",
            MonitorError::Serialization(_) => "serialization",
            MonitorError::Lifecycle(_) => "lifecycle",
            MonitorError::Generic(_) => "generic",
        }
    }
}

impl From<String> for MonitorError {
    fn from(msg: String) -> Self {
        MonitorError::Generic(msg)
    }
}

impl From<&str> for MonitorError {
    fn from(msg: &str) -> Self {
        MonitorError::Generic(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categorization() {
        let io_error = MonitorError::Io(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert_eq!(io_error.category(), "io");
        assert!(io_error.is_recoverable());

        let config_error = MonitorError::Config(ConfigError::InvalidValue {
            field: "retention_days".to_string(),
            value: "0".to_string(),
        });
        assert_eq!(config_error.category(), "config");
        assert!(!config_error.is_recoverable());

        let mkdir_error = MonitorError::Storage(StorageError::DirectoryCreationFailed {
            path: "/nope".to_string(),
        });
        assert!(!mkdir_error.is_recoverable());
    }

    #[test]
    fn test_error_conversion() {
        let err = MonitorError::from("tick failed");
        assert!(matches!(err, MonitorError::Generic(_)));
        assert_eq!(err.to_string(), "tick failed");
    }
}
