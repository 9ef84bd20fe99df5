//! Process-safe locking for manifest updates.
//!
//! The manifest is updated with a read-modify-write cycle. Two compilations
//! writing different outputs into the same manifest must not overwrite each
//! other's entries, so the cycle runs under an exclusive advisory lock on a
//! sibling `<manifest>.lock` file. The lock is released when the guard drops.

use anyhow::{Context, Result};
use fs4::fs_std::FileExt;
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// An exclusive lock guarding one manifest file.
pub struct ManifestLock {
    file: File,
    path: PathBuf,
}

impl ManifestLock {
    /// Acquire the lock for `manifest_path`, waiting for other holders.
    ///
    /// The blocking lock call runs on the blocking thread pool so the async
    /// runtime keeps making progress while waiting.
    ///
    /// # Errors
    ///
    /// Fails if the lock file cannot be created or locked.
    pub async fn acquire(manifest_path: &Path) -> Result<Self> {
        let lock_path = lock_path_for(manifest_path);
        if let Some(parent) = lock_path.parent() {
            tokio::fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create directory {}", parent.display())
            })?;
        }

        let path = lock_path.clone();
        let file = tokio::task::spawn_blocking(move || -> Result<File> {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&path)
                .with_context(|| format!("Failed to open lock file: {}", path.display()))?;

            file.lock_exclusive()
                .with_context(|| format!("Failed to acquire lock: {}", path.display()))?;

            Ok(file)
        })
        .await
        .context("Failed to spawn blocking task for lock acquisition")??;

        tracing::trace!("Acquired manifest lock {}", lock_path.display());
        Ok(Self {
            file,
            path: lock_path,
        })
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ManifestLock {
    fn drop(&mut self) {
        #[allow(unstable_name_collisions)]
        if let Err(e) = self.file.unlock() {
            tracing::warn!("Failed to unlock {}: {}", self.path.display(), e);
        }
    }
}

fn lock_path_for(manifest_path: &Path) -> PathBuf {
    let mut name = manifest_path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".lock");
    manifest_path.with_file_name(name)
}
