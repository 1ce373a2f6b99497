// Test suite for the utils module
// Covers the daemon error taxonomy and logging setup.

use crate::utils::error::{DaemonError, Result};

#[cfg(test)]
mod error_tests {
    use super::*;
    use std::error::Error;
    use std::io;

    /// Test conversion from std::io::Error to DaemonError
    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let daemon_error: DaemonError = io_error.into();
        match daemon_error {
            DaemonError::IoError(_) => (),
            _ => panic!("Expected IoError"),
        }
    }

    /// Test conversion from TOML deserialization error
    #[test]
    fn test_toml_de_error_conversion() {
        let result: std::result::Result<toml::Value, toml::de::Error> =
            toml::from_str("invalid toml [");
        let daemon_error: DaemonError = result.unwrap_err().into();
        match daemon_error {
            DaemonError::ConfigError(_) => (),
            _ => panic!("Expected ConfigError from TOML deserialization"),
        }
    }

    /// Test error message formatting
    #[test]
    fn test_error_formatting() {
        let error_cases = vec![
            (
                DaemonError::InvalidArguments("Bad input".to_string()),
                "Invalid arguments: Bad input",
            ),
            (DaemonError::NotFound("/tmp/x".to_string()), "Resource not found: /tmp/x"),
            (DaemonError::SystemError("grim failed".to_string()), "System error: grim failed"),
            (DaemonError::ConfigError("bad port".to_string()), "Configuration error: bad port"),
            (DaemonError::RegistryError("gap".to_string()), "Registry error: gap"),
            (DaemonError::LoggingError("no file".to_string()), "Logging error: no file"),
        ];

        for (error, expected) in error_cases {
            assert_eq!(format!("{}", error), expected);
        }
    }

    /// Test that bind failures keep their io::Error as source
    #[test]
    fn test_bind_error_source() {
        let error = DaemonError::BindError {
            addr: "0.0.0.0:1729".to_string(),
            source: io::Error::new(io::ErrorKind::AddrInUse, "address in use"),
        };
        assert!(error.to_string().starts_with("Failed to bind 0.0.0.0:1729"));
        assert!(error.source().is_some());
    }

    /// Test that daemon errors box into the handler error type
    #[test]
    fn test_boxes_as_send_sync_error() {
        fn fails() -> std::result::Result<(), Box<dyn Error + Send + Sync>> {
            let lookup: Result<()> = Err(DaemonError::NotFound("missing".to_string()));
            lookup?;
            Ok(())
        }
        assert_eq!(fails().unwrap_err().to_string(), "Resource not found: missing");
    }

    /// Test error propagation behavior
    #[test]
    fn test_error_propagation() {
        fn operation_that_fails() -> Result<String> {
            Err(DaemonError::NotFound("Item not found".to_string()))
        }

        match operation_that_fails() {
            Err(DaemonError::NotFound(msg)) => assert_eq!(msg, "Item not found"),
            _ => panic!("Expected NotFound error"),
        }
    }
}

#[cfg(test)]
mod tracing_tests {
    use crate::config::LogConfig;
    use crate::utils::tracing::setup_tracing;

    /// Logging setup fails cleanly when the log file cannot be opened
    #[test]
    fn test_setup_tracing_unwritable_path() {
        let log = LogConfig {
            path: "/nonexistent-dir/remotecmdd.log".into(),
            level: "info".to_string(),
        };
        match setup_tracing(&log) {
            Err(super::DaemonError::LoggingError(msg)) => assert!(msg.contains("cannot open")),
            _ => panic!("Expected LoggingError"),
        }
    }

    #[test]
    fn test_setup_tracing_creates_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let log = LogConfig {
            path: dir.path().join("remotecmdd.log"),
            level: "debug".to_string(),
        };
        let guard = setup_tracing(&log).unwrap();
        tracing::info!("tracing test line");
        drop(guard);
        assert!(log.path.exists());
    }
}
