//! JSON file I/O.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::atomic::safe_write;

/// Reads and parses a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn read_json_file<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON from file: {}", path.display()))
}

/// Writes data as JSON to a file atomically.
///
/// Pretty output ends with a trailing newline.
pub fn write_json_file<T>(path: &Path, data: &T, pretty: bool) -> Result<()>
where
    T: serde::Serialize,
{
    let json = if pretty {
        let mut json = serde_json::to_string_pretty(data)?;
        json.push('\n');
        json
    } else {
        serde_json::to_string(data)?
    };

    safe_write(path, &json).with_context(|| format!("Failed to write JSON file: {}", path.display()))
}
