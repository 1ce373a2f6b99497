//! Tracing Utilities Module
//!
//! This module contains tracing functionality for the remotecmd daemon,
//! including logging configuration with file output.

use crate::config::LogConfig;
use crate::utils::error::{DaemonError, Result};
use std::fs::OpenOptions;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initializes the tracing subscriber with file and console output
///
/// The returned guard flushes the file writer when dropped and must be held
/// until the daemon exits.
pub fn setup_tracing(log: &LogConfig) -> Result<WorkerGuard> {
    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(&log.path)
        .map_err(|e| {
            DaemonError::LoggingError(format!("cannot open {}: {}", log.path.display(), e))
        })?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&log.level))
        .map_err(|e| DaemonError::LoggingError(e.to_string()))?;

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_filter(env_filter.clone());

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .map_err(|e| DaemonError::LoggingError(e.to_string()))?;

    Ok(guard)
}
