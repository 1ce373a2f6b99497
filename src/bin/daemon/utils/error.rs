//! Unified Error Handling System
//!
//! This module defines the error types for the remotecmd daemon: failures of
//! the command actions themselves and startup failures (configuration,
//! binding, logging, registry validation).

use std::io;
use thiserror::Error;

/// Enumeration of all daemon error types
#[derive(Error, Debug)]
pub enum DaemonError {
    /// Invalid arguments error
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// System I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// Resource not found error
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// External program or system facility failure
    #[error("System error: {0}")]
    SystemError(String),

    /// Configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The listening endpoint could not be bound
    #[error("Failed to bind {addr}: {source}")]
    BindError {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// The command table is inconsistent
    #[error("Registry error: {0}")]
    RegistryError(String),

    /// Logging could not be initialized
    #[error("Logging error: {0}")]
    LoggingError(String),
}

impl From<toml::de::Error> for DaemonError {
    fn from(error: toml::de::Error) -> Self {
        DaemonError::ConfigError(error.to_string())
    }
}

/// Standardized result type for the daemon
pub type Result<T> = std::result::Result<T, DaemonError>;
