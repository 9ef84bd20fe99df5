//! Compilation driver.
//!
//! The [`Pipeline`] connects the pieces of a build:
//!
//! ```text
//! entry ─► graph (directives, resolution, templates) ─► render ─► [minify] ─► dest
//!                                                                              │
//!                                              build record ◄─ visited files ──┤
//!                                                  manifest ◄─ dependency tree ┘
//! ```
//!
//! Every compilation starts a fresh [`CompilationRun`](crate::graph::CompilationRun),
//! so one pipeline can serve many entries concurrently. The only state shared
//! between compilations is the [`BuildRecord`] of visited sources per destination
//! (used to decide staleness) and the manifest file, which is updated under a
//! file lock.
//!
//! A failed compilation writes nothing: no artifact, no record entry and no
//! manifest entry.

use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use crate::cache::{BuildRecord, should_rebuild};
use crate::core::{GcpError, GcpResult};
use crate::graph::{CompilationRun, FileNode};
use crate::manifest::write_manifest;
use crate::minify::{Minifier, MinifyOptions};
use crate::render::render;
use crate::templating::TemplateRenderer;
use crate::utils::fs::{relative_path, safe_write};

/// Options for one compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Rebuild even when the destination is fresh
    pub force: bool,
    /// Pass the output through the minifier
    pub minify: bool,
    /// Let the minifier rename identifiers
    pub mangle: bool,
    /// Let the minifier compress expressions
    pub compress: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            force: false,
            minify: false,
            mangle: true,
            compress: true,
        }
    }
}

impl CompileOptions {
    /// Minifier settings, or `None` when minification is off.
    #[must_use]
    pub fn minify_options(&self) -> Option<MinifyOptions> {
        self.minify.then_some(MinifyOptions {
            mangle_names: self.mangle,
            compress_expressions: self.compress,
        })
    }
}

/// Outcome of [`Pipeline::resolve_and_check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStatus {
    /// The existing destination was fresh and left untouched
    Cached,
    /// The destination was (re)written
    Rebuilt,
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cached => write!(f, "cached"),
            Self::Rebuilt => write!(f, "rebuilt"),
        }
    }
}

/// Builds artifacts from entry files.
pub struct Pipeline {
    templates: Arc<dyn TemplateRenderer>,
    minifier: Option<Arc<dyn Minifier>>,
    manifest: Option<PathBuf>,
    record: BuildRecord,
    started_at: SystemTime,
}

impl Pipeline {
    /// Create a pipeline rendering templates with `templates`.
    ///
    /// Minification requires a minifier set with [`Pipeline::with_minifier`].
    pub fn new(templates: Arc<dyn TemplateRenderer>) -> Self {
        Self {
            templates,
            minifier: None,
            manifest: None,
            record: BuildRecord::new(),
            started_at: SystemTime::now(),
        }
    }

    /// Use `minifier` for minified output.
    #[must_use]
    pub fn with_minifier(mut self, minifier: Arc<dyn Minifier>) -> Self {
        self.minifier = Some(minifier);
        self
    }

    /// Record every written artifact's dependency tree in `manifest`.
    #[must_use]
    pub fn with_manifest(mut self, manifest: impl Into<PathBuf>) -> Self {
        self.manifest = Some(manifest.into());
        self
    }

    /// When this pipeline was created; minified outputs older than this are stale.
    pub fn started_at(&self) -> SystemTime {
        self.started_at
    }

    /// The record of sources visited per destination.
    pub fn record(&self) -> &BuildRecord {
        &self.record
    }

    /// Resolve the dependency tree of `entry` in a fresh compilation run.
    ///
    /// # Errors
    ///
    /// Any resolution, I/O, template or cycle error.
    pub async fn build_tree(&self, entry: &Path) -> GcpResult<FileNode> {
        CompilationRun::new(self.templates.as_ref()).build(entry).await
    }

    /// Compile `entry` into `dest`.
    ///
    /// # Errors
    ///
    /// Fails if the tree cannot be built, minification fails, or the artifact
    /// or manifest cannot be written. Nothing is written on failure.
    pub async fn compile(&self, entry: &Path, dest: &Path, options: CompileOptions) -> Result<()> {
        let tree = self.build_tree(entry).await?;
        self.emit(&tree, dest, options.minify_options()).await
    }

    /// Write an artifact for an already resolved tree.
    ///
    /// The tree is rendered, minified when `minify` is given, and written to
    /// `dest` atomically. The manifest (if any) is updated next, and the visited
    /// sources are recorded for `dest` last.
    ///
    /// # Errors
    ///
    /// Fails if minification fails or the artifact or manifest cannot be written.
    /// When the manifest update fails the new artifact is removed again and
    /// nothing is recorded.
    pub async fn emit(&self, tree: &FileNode, dest: &Path, minify: Option<MinifyOptions>) -> Result<()> {
        let mut output = render(tree);
        if let Some(options) = minify {
            output = self.minify(&output, options).await?;
        }

        safe_write(dest, &output)
            .with_context(|| format!("Failed to write compiled output to {}", dest.display()))?;

        if let Some(manifest) = &self.manifest
            && let Err(e) = update_manifest(manifest, dest, tree).await
        {
            if let Err(remove_err) = tokio::fs::remove_file(dest).await {
                tracing::warn!("Failed to remove {} after manifest error: {}", dest.display(), remove_err);
            }
            self.record.forget(dest);
            return Err(e);
        }

        tracing::info!("Wrote {} ({} bytes)", dest.display(), output.len());
        self.record.record(dest.to_path_buf(), tree.visited_paths());
        Ok(())
    }

    /// Compile `entry` into `dest` unless the existing `dest` is still fresh.
    ///
    /// The sources of `dest` come from the build record. When this pipeline has
    /// not built `dest` yet (for example after a restart) but the file exists,
    /// they are recovered with a dependency scan of `entry` that reads headers
    /// without rendering anything.
    ///
    /// # Errors
    ///
    /// Any error from the dependency scan or from [`Pipeline::compile`].
    pub async fn resolve_and_check(
        &self,
        entry: &Path,
        dest: &Path,
        options: CompileOptions,
    ) -> Result<BuildStatus> {
        if !options.force
            && let Some(sources) = self.known_sources(entry, dest).await?
            && !should_rebuild(dest, &sources, self.started_at, options.force, options.minify)?
        {
            tracing::debug!("{} is up to date", dest.display());
            self.record.record(dest.to_path_buf(), sources);
            return Ok(BuildStatus::Cached);
        }

        self.compile(entry, dest, options).await?;
        Ok(BuildStatus::Rebuilt)
    }

    /// Sources of `dest`, from the record or a scan of `entry`.
    ///
    /// `None` when `dest` does not exist and has no record.
    async fn known_sources(&self, entry: &Path, dest: &Path) -> Result<Option<Vec<PathBuf>>> {
        if let Some(sources) = self.record.sources(dest) {
            return Ok(Some(sources));
        }

        let exists = tokio::fs::try_exists(dest)
            .await
            .with_context(|| format!("Failed to check {}", dest.display()))?;
        if !exists {
            tracing::debug!("No previous output at {}", dest.display());
            return Ok(None);
        }

        tracing::debug!("No build record for {}, scanning {}", dest.display(), entry.display());
        let tree = CompilationRun::scan_only().build(entry).await?;
        Ok(Some(tree.visited_paths()))
    }

    async fn minify(&self, code: &str, options: MinifyOptions) -> GcpResult<String> {
        let minifier = self.minifier.as_ref().ok_or_else(|| GcpError::Minify {
            reason: "no minifier configured".to_string(),
        })?;
        minifier.minify(code, options).await
    }
}

async fn update_manifest(manifest: &Path, dest: &Path, tree: &FileNode) -> Result<()> {
    let output_name = manifest_key(manifest, dest)?;
    write_manifest(manifest, &output_name, tree).await
}

/// Key of `dest` in `manifest`: its path relative to the manifest's directory.
fn manifest_key(manifest: &Path, dest: &Path) -> Result<String> {
    let dest = dest
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", dest.display()))?;
    let manifest_dir = match manifest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let manifest_dir = manifest_dir
        .canonicalize()
        .unwrap_or_else(|_| std::path::absolute(&manifest_dir).unwrap_or(manifest_dir));
    Ok(relative_path(&manifest_dir, &dest))
}
