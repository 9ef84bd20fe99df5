//! Throwaway project layout for tests.
//!
//! ```text
//! <temp>/
//! ├── gcp.toml      (optional, see TestEnvironment::write_config)
//! ├── src/          source tree
//! └── public/       output directory
//! ```

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// A temporary project with a source and an output directory.
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub root: PathBuf,
    pub source_dir: PathBuf,
    pub dest_dir: PathBuf,
}

impl TestEnvironment {
    /// Create an empty project.
    ///
    /// `root` is canonical so it compares equal to the paths stored in
    /// dependency trees.
    pub fn new() -> Result<Self> {
        super::init_test_logging(None);

        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().canonicalize()?;
        let source_dir = root.join("src");
        let dest_dir = root.join("public");

        fs::create_dir_all(&source_dir)?;
        fs::create_dir_all(&dest_dir)?;

        Ok(Self {
            temp_dir,
            root,
            source_dir,
            dest_dir,
        })
    }

    /// Create a project with a `gcp.toml` pointing at `src/` and `public/`.
    pub fn with_config() -> Result<Self> {
        let env = Self::new()?;
        env.write_config("source = \"src\"\ndest = \"public\"\nminify = false\n")?;
        Ok(env)
    }

    /// Write `gcp.toml` at the project root.
    pub fn write_config(&self, content: &str) -> Result<PathBuf> {
        self.write_file(&self.root.join("gcp.toml"), content)
    }

    /// Write a file below the source directory, creating parents.
    pub fn write_source(&self, relative: &str, content: &str) -> Result<PathBuf> {
        self.write_file(&self.source_path(relative), content)
    }

    /// Path of a file below the source directory.
    pub fn source_path(&self, relative: &str) -> PathBuf {
        self.source_dir.join(relative)
    }

    /// Path of a file below the output directory.
    pub fn dest_path(&self, relative: &str) -> PathBuf {
        self.dest_dir.join(relative)
    }

    /// Read a file below the output directory.
    pub fn read_dest(&self, relative: &str) -> Result<String> {
        let path = self.dest_path(relative);
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
    }

    /// Move a file's modification time `seconds` into the future.
    pub fn touch_future(&self, path: &Path, seconds: u64) -> Result<()> {
        let time = SystemTime::now() + Duration::from_secs(seconds);
        fs::File::options()
            .write(true)
            .open(path)
            .and_then(|file| file.set_modified(time))
            .with_context(|| format!("Failed to set mtime of {}", path.display()))
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<PathBuf> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path.to_path_buf())
    }
}
