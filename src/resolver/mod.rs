//! Reference resolution for header directives.
//!
//! A [`Directive`] names its target relative to the directory of the file that
//! declares it. This module turns that raw argument into filesystem paths:
//!
//! - `require` / `include` arguments are probed against the supported extensions
//!   (`.js`, `.ejs`, `.hbs`) in priority order. The first existing candidate wins.
//! - `require_directory` arguments expand to the supported files directly inside
//!   the directory, in directory listing order.
//! - `require_tree` arguments expand to the supported files anywhere below the
//!   directory, in walk order.
//!
//! Listing and walk order are deliberately left unsorted so the output mirrors
//! what the filesystem reports.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::constants::SUPPORTED_EXTENSIONS;
use crate::core::{GcpError, GcpResult};
use crate::directive::{Command, Directive};

/// A directive argument resolved to a filesystem target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedReference {
    /// A module to concatenate once (`require`)
    SingleFile(PathBuf),
    /// A fragment to concatenate at every reference point (`include`)
    Fragment(PathBuf),
    /// A directory whose immediate supported files are required
    Directory(PathBuf),
    /// A directory whose supported files at any depth are required
    Tree(PathBuf),
}

/// Resolve one directive relative to the directory of the declaring file.
///
/// # Errors
///
/// - [`GcpError::NotFound`] when no candidate file exists for `require`/`include`
/// - [`GcpError::MissingDirectory`] when a directory target does not exist
pub async fn resolve(directive: &Directive, base_dir: &Path) -> GcpResult<ResolvedReference> {
    match directive.command {
        Command::Require => {
            probe_extensions(&directive.argument, base_dir).await.map(ResolvedReference::SingleFile)
        }
        Command::Include => {
            probe_extensions(&directive.argument, base_dir).await.map(ResolvedReference::Fragment)
        }
        Command::RequireDirectory => {
            require_existing_dir(base_dir.join(&directive.argument)).await.map(ResolvedReference::Directory)
        }
        Command::RequireTree => {
            require_existing_dir(base_dir.join(&directive.argument)).await.map(ResolvedReference::Tree)
        }
    }
}

/// Probe `<base_dir>/<argument>` against the supported extensions.
///
/// A supported extension already present on the argument is stripped first, so
/// `require foo.js` and `require foo` resolve identically.
///
/// # Errors
///
/// Returns [`GcpError::NotFound`] if no candidate exists.
pub async fn probe_extensions(argument: &str, base_dir: &Path) -> GcpResult<PathBuf> {
    let stem = strip_supported_extension(argument);
    let base = base_dir.join(stem);

    for ext in SUPPORTED_EXTENSIONS {
        let mut candidate = base.clone().into_os_string();
        candidate.push(ext);
        let candidate = PathBuf::from(candidate);
        if is_file(&candidate).await {
            tracing::trace!("Resolved '{}' to {}", argument, candidate.display());
            return Ok(candidate);
        }
    }

    Err(GcpError::NotFound {
        reference: argument.to_string(),
        searched: base.display().to_string(),
    })
}

/// Expand a [`ResolvedReference::Directory`] or [`ResolvedReference::Tree`] into
/// the files it requires. File references expand to themselves.
///
/// # Errors
///
/// Returns [`GcpError::MissingDirectory`] if the directory vanished, or
/// [`GcpError::Io`] if it cannot be listed.
pub async fn expand(reference: &ResolvedReference) -> GcpResult<Vec<PathBuf>> {
    match reference {
        ResolvedReference::SingleFile(path) | ResolvedReference::Fragment(path) => {
            Ok(vec![path.clone()])
        }
        ResolvedReference::Directory(dir) => list_directory(dir).await,
        ResolvedReference::Tree(dir) => walk_tree(dir.clone()).await,
    }
}

/// Supported files directly inside `dir`, in listing order.
async fn list_directory(dir: &Path) -> GcpResult<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| missing_or_io(dir, &e))?;

    let mut files = Vec::new();
    while let Some(entry) =
        entries.next_entry().await.map_err(|e| GcpError::io("listing", dir, &e))?
    {
        let path = entry.path();
        if has_supported_extension(&path) && is_file(&path).await {
            files.push(path);
        }
    }

    tracing::debug!("require_directory {} matched {} file(s)", dir.display(), files.len());
    Ok(files)
}

/// Supported files anywhere below `dir`, in walk order.
async fn walk_tree(dir: PathBuf) -> GcpResult<Vec<PathBuf>> {
    let walk_dir = dir.clone();
    let files = tokio::task::spawn_blocking(move || -> GcpResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(&walk_dir).min_depth(1).follow_links(true) {
            let entry = entry.map_err(|e| GcpError::Io {
                operation: "walking".to_string(),
                path: walk_dir.display().to_string(),
                reason: e.to_string(),
            })?;
            if entry.file_type().is_file() && has_supported_extension(entry.path()) {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    })
    .await
    .map_err(|e| GcpError::Other {
        message: format!("Tree walk task failed for {}: {e}", dir.display()),
    })??;

    tracing::debug!("require_tree {} matched {} file(s)", dir.display(), files.len());
    Ok(files)
}

async fn require_existing_dir(dir: PathBuf) -> GcpResult<PathBuf> {
    match tokio::fs::metadata(&dir).await {
        Ok(metadata) if metadata.is_dir() => Ok(dir),
        _ => Err(GcpError::MissingDirectory {
            path: dir.display().to_string(),
        }),
    }
}

fn missing_or_io(dir: &Path, error: &std::io::Error) -> GcpError {
    if error.kind() == std::io::ErrorKind::NotFound {
        GcpError::MissingDirectory {
            path: dir.display().to_string(),
        }
    } else {
        GcpError::io("listing", dir, error)
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false)
}

/// Remove one trailing supported extension from a directive argument.
#[must_use]
pub fn strip_supported_extension(argument: &str) -> &str {
    SUPPORTED_EXTENSIONS
        .iter()
        .find_map(|ext| argument.strip_suffix(*ext))
        .filter(|stem| !stem.is_empty())
        .unwrap_or(argument)
}

/// Whether a file name ends with one of the supported extensions.
#[must_use]
pub fn has_supported_extension(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .is_some_and(|name| SUPPORTED_EXTENSIONS.iter().any(|ext| name.ends_with(*ext)))
}
