//! File metadata queries.

use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::SystemTime;

/// Modification time of a file, or `None` when it does not exist.
///
/// # Errors
///
/// Fails for any error other than the file being absent.
pub fn modified_time_if_exists(path: &Path) -> Result<Option<SystemTime>> {
    match fs::metadata(path) {
        Ok(metadata) => metadata
            .modified()
            .map(Some)
            .with_context(|| format!("Failed to get modification time for: {}", path.display())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => {
            Err(e).with_context(|| format!("Failed to get metadata for: {}", path.display()))
        }
    }
}
