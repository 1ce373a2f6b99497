//! Screen Capture Module
//!
//! Screenshots are taken by an external capture program that writes the image
//! to a fixed path; `send photo` later returns the bytes of that file.

use crate::config::CaptureConfig;
use crate::utils::error::{DaemonError, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, error, info};

/// Screen capture facility bound to one capture program and image path
#[derive(Debug, Clone)]
pub struct ScreenCapture {
    program: String,
    args: Vec<String>,
    image_path: PathBuf,
}

impl ScreenCapture {
    pub fn new(config: &CaptureConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            image_path: config.image_path.clone(),
        }
    }

    pub fn image_path(&self) -> &Path {
        &self.image_path
    }

    /// Captures the screen into the configured image path.
    ///
    /// # Returns
    /// A `Result` indicating success, or a `SystemError` carrying the capture
    /// program's stderr if it could not be run or exited unsuccessfully.
    pub fn take_screenshot(&self) -> Result<()> {
        info!("Capturing screenshot with {}", self.program);

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(&self.image_path)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                DaemonError::SystemError(format!(
                    "{} is not installed or unavailable: {}",
                    self.program, e
                ))
            })?;

        if !output.status.success() {
            let error_message = String::from_utf8_lossy(&output.stderr);
            error!("Failed to capture screen: {}", error_message);
            return Err(DaemonError::SystemError(format!(
                "Failed to capture screen: {}",
                error_message.trim()
            )));
        }

        info!("Screenshot saved to: {}", self.image_path.display());
        Ok(())
    }

    /// Reads the last captured image.
    pub fn read_photo(&self) -> Result<Vec<u8>> {
        match fs::read(&self.image_path) {
            Ok(bytes) => {
                debug!("Read {} bytes from {}", bytes.len(), self.image_path.display());
                Ok(bytes)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(DaemonError::NotFound(format!(
                "no screenshot at {}",
                self.image_path.display()
            ))),
            Err(e) => Err(e.into()),
        }
    }
}
