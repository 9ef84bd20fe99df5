//! Filesystem helpers shared by the pipeline, manifest and CLI.
//!
//! - [`fs`] - atomic writes, directory creation, JSON I/O and modification times

pub mod fs;

pub use fs::{atomic_write, ensure_dir, ensure_parent_dir, safe_write};
