//! Configuration Module
//!
//! This module provides defaults and the TOML configuration file for the
//! remotecmd daemon. Every field is optional in the file; missing values fall
//! back to the constants below.

use crate::utils::error::{DaemonError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Constants for default settings
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 1729;
pub const DEFAULT_MAX_PAYLOAD_LEN: usize = remotecmd::protocol::frame::DEFAULT_MAX_PAYLOAD_LEN;
pub const DEFAULT_LOG_PATH: &str = "server.log";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 10;

/// Constants for screen capture
pub const DEFAULT_CAPTURE_PROGRAM: &str = "grim";
pub const DEFAULT_IMAGE_PATH: &str = "screen.jpg";

/// Complete daemon configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Address the listener binds to
    pub host: String,
    /// TCP port the listener binds to
    pub port: u16,
    /// Largest payload length a peer may advertise
    pub max_payload_len: usize,
    /// Seconds a session may spend reading one frame before it is closed
    pub idle_timeout_secs: Option<u64>,
    /// Seconds live sessions get to finish after a shutdown signal
    pub shutdown_grace_secs: u64,
    pub log: LogConfig,
    pub capture: CaptureConfig,
}

/// Log file and level
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub path: PathBuf,
    /// Filter used when `RUST_LOG` is not set
    pub level: String,
}

/// External screen capture program
///
/// The program is invoked as `<program> <args...> <image_path>`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub program: String,
    pub args: Vec<String>,
    pub image_path: PathBuf,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_payload_len: DEFAULT_MAX_PAYLOAD_LEN,
            idle_timeout_secs: None,
            shutdown_grace_secs: DEFAULT_SHUTDOWN_GRACE_SECS,
            log: LogConfig::default(),
            capture: CaptureConfig::default(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_LOG_PATH),
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_CAPTURE_PROGRAM.to_string(),
            args: Vec::new(),
            image_path: PathBuf::from(DEFAULT_IMAGE_PATH),
        }
    }
}

impl DaemonConfig {
    /// Load the configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            DaemonError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: DaemonConfig = toml::from_str(contents)?;
        if config.max_payload_len == 0 {
            return Err(DaemonError::ConfigError(
                "max_payload_len must be greater than zero".to_string(),
            ));
        }
        Ok(config)
    }

    /// `host:port` string handed to the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Deadline for reading one frame; zero disables it
    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DaemonConfig::default();
        assert_eq!(config.bind_address(), "0.0.0.0:1729");
        assert_eq!(config.capture.image_path, PathBuf::from("screen.jpg"));
        assert_eq!(config.log.path, PathBuf::from("server.log"));
        assert_eq!(config.idle_timeout(), None);
        assert_eq!(config.shutdown_grace(), Duration::from_secs(10));
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(DaemonConfig::from_toml_str("").unwrap(), DaemonConfig::default());
    }

    #[test]
    fn test_partial_file() {
        let config = DaemonConfig::from_toml_str(
            r#"
            port = 4000
            idle_timeout_secs = 30
            shutdown_grace_secs = 2

            [capture]
            program = "scrot"
            args = ["--overwrite"]
            "#,
        )
        .unwrap();

        assert_eq!(config.port, 4000);
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.idle_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.shutdown_grace(), Duration::from_secs(2));
        assert_eq!(config.capture.program, "scrot");
        assert_eq!(config.capture.args, vec!["--overwrite".to_string()]);
        assert_eq!(config.capture.image_path, PathBuf::from(DEFAULT_IMAGE_PATH));
        assert_eq!(config.log.level, DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn test_zero_idle_timeout_disables_deadline() {
        let config = DaemonConfig::from_toml_str("idle_timeout_secs = 0").unwrap();
        assert_eq!(config.idle_timeout(), None);
    }

    #[test]
    fn test_invalid_file() {
        match DaemonConfig::from_toml_str("port = \"not a port\"") {
            Err(DaemonError::ConfigError(_)) => (),
            other => panic!("Expected ConfigError, got {:?}", other),
        }
        assert!(DaemonConfig::from_toml_str("max_payload_len = 0").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let result = DaemonConfig::load(Path::new("/nonexistent/remotecmdd.toml"));
        assert!(matches!(result, Err(DaemonError::ConfigError(_))));
    }
}
