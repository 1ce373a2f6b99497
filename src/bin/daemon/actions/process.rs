use crate::utils::error::{DaemonError, Result};
use std::process::{Command, Stdio};
use tracing::{info, warn};

/// Launches the program at `path` and waits for it to finish.
///
/// The program runs with stdin detached. A launch failure or a non-zero exit
/// status is reported as a `SystemError`.
pub fn execute_program(path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(DaemonError::InvalidArguments(
            "execute requires a program path".to_string(),
        ));
    }

    info!("Executing {}", path);
    let status = Command::new(path)
        .stdin(Stdio::null())
        .status()
        .map_err(|e| DaemonError::SystemError(format!("failed to launch {}: {}", path, e)))?;

    if !status.success() {
        warn!("{} exited with {}", path, status);
        return Err(DaemonError::SystemError(format!(
            "{} exited with {}",
            path, status
        )));
    }

    Ok(())
}
