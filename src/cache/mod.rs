//! Artifact staleness: deciding whether a compiled file can be reused.
//!
//! A compiled artifact is reusable when it exists and no file that went into it
//! has been modified since it was written. The pipeline keeps a [`BuildRecord`]
//! mapping each destination to the files visited while producing it. An
//! artifact left by an earlier process has no record; its input files are
//! recovered with a dependency scan of the entry before deciding.
//!
//! # Decision Order
//!
//! [`should_rebuild`] answers `true` as soon as one of these holds:
//!
//! 1. `force` was requested
//! 2. the destination does not exist
//! 3. minified output is requested and the destination predates the current
//!    process (minifier settings may have changed since)
//! 4. any recorded source is missing or strictly newer than the destination
//!
//! Comparison uses filesystem modification times as reported, with no content
//! hashing.

use anyhow::Result;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::utils::fs::modified_time_if_exists;

/// Decide whether `dest` must be rebuilt from `sources`.
///
/// # Arguments
///
/// * `dest` - The compiled artifact
/// * `sources` - Every file visited when `dest` was last built
/// * `build_start` - When the current process started
/// * `force` - Rebuild unconditionally
/// * `minify` - Whether the artifact is minified output
///
/// # Errors
///
/// Fails only if file metadata cannot be read for a reason other than the file
/// being absent.
pub fn should_rebuild(
    dest: &Path,
    sources: &[PathBuf],
    build_start: SystemTime,
    force: bool,
    minify: bool,
) -> Result<bool> {
    if force {
        tracing::debug!("Rebuilding {}: forced", dest.display());
        return Ok(true);
    }

    let Some(dest_time) = modified_time_if_exists(dest)? else {
        tracing::debug!("Rebuilding {}: no previous output", dest.display());
        return Ok(true);
    };

    if minify && dest_time < build_start {
        tracing::debug!("Rebuilding {}: minified output predates this process", dest.display());
        return Ok(true);
    }

    for source in sources {
        match modified_time_if_exists(source)? {
            Some(source_time) if source_time > dest_time => {
                tracing::debug!(
                    "Rebuilding {}: {} changed",
                    dest.display(),
                    source.display()
                );
                return Ok(true);
            }
            Some(_) => {}
            None => {
                tracing::debug!(
                    "Rebuilding {}: {} no longer exists",
                    dest.display(),
                    source.display()
                );
                return Ok(true);
            }
        }
    }

    Ok(false)
}

/// Source files visited for each destination built or checked by this process.
///
/// Shared between concurrent builds; each destination owns one entry.
#[derive(Debug, Default)]
pub struct BuildRecord {
    sources: DashMap<PathBuf, Vec<PathBuf>>,
}

impl BuildRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sources recorded for `dest`, if this process built or checked it.
    pub fn sources(&self, dest: &Path) -> Option<Vec<PathBuf>> {
        self.sources.get(dest).map(|entry| entry.value().clone())
    }

    /// Replace the sources recorded for `dest`.
    pub fn record(&self, dest: PathBuf, sources: Vec<PathBuf>) {
        self.sources.insert(dest, sources);
    }

    /// Drop the entry for `dest`.
    pub fn forget(&self, dest: &Path) {
        self.sources.remove(dest);
    }

    /// Number of destinations recorded.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
