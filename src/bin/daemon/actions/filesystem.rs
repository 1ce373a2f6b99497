use crate::utils::error::{DaemonError, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Lists the entries of a directory.
///
/// Entry names are sorted and joined with `\n`, without a trailing newline.
/// An empty directory yields an empty string.
///
/// # Arguments
/// * `path` - The directory to list.
///
/// # Returns
/// A `Result` containing the listing, or `NotFound` if `path` is not an existing directory.
pub fn list_directory(path: &str) -> Result<String> {
    let dir = Path::new(path);
    if !dir.is_dir() {
        warn!("Requested listing of invalid path: {}", path);
        return Err(DaemonError::NotFound(format!(
            "{} is not an existing directory",
            path
        )));
    }

    let mut names = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<std::io::Result<Vec<_>>>()?;
    names.sort();

    debug!("Listed {} entries in {}", names.len(), path);
    Ok(names.join("\n"))
}

/// Deletes a single file.
pub fn delete_file(path: &str) -> Result<()> {
    fs::remove_file(path)?;
    info!("Deleted {}", path);
    Ok(())
}

/// Copies the contents of `source` into `destination`, replacing it if present.
pub fn copy_file(source: &str, destination: &str) -> Result<()> {
    if !Path::new(source).is_file() {
        return Err(DaemonError::NotFound(format!("{} is not a file", source)));
    }

    let bytes = fs::copy(source, destination)?;
    info!("Copied {} to {} ({} bytes)", source, destination, bytes);
    Ok(())
}
