//! Dependency graph construction.
//!
//! [`CompilationRun`] turns an entry file into a tree of [`FileNode`] values by
//! reading every file once, parsing its header directives, resolving them and
//! recursing into the results.
//!
//! # Duplicate Suppression
//!
//! The run owns a registry of canonical paths already claimed by a required
//! module. Registration happens in depth-first pre-order: a node claims its path
//! before any of its dependencies are built. The first `require` of a path in
//! that order produces the real node; every later `require` produces a
//! [`FileNode::duplicate`] leaf that is neither read nor expanded. Because a
//! dependency is always claimed deeper in the tree than (or before) a later
//! sibling that repeats it, the rendered output stays dependency-first.
//!
//! `include` directives bypass the registry entirely: every include produces a
//! full node.
//!
//! # Cycles
//!
//! The run also tracks the chain of files currently being expanded. A directive
//! that points back into that chain fails the run with
//! [`GcpError::CycleDetected`].
//!
//! # Isolation
//!
//! A run is created per build and consumed by [`CompilationRun::build`]. Runs
//! share nothing, so builds of different entries can execute concurrently.

mod node;

pub use node::{FileNode, NodeKind};

use futures::future::{BoxFuture, FutureExt};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::core::{GcpError, GcpResult};
use crate::directive::{Command, parse_directives};
use crate::resolver;
use crate::templating::{TemplateDialect, TemplateRenderer};

/// Per-build context for dependency resolution.
pub struct CompilationRun<'a> {
    /// Canonical paths claimed by a required module in this run
    registry: HashSet<PathBuf>,
    /// Files currently being expanded, outermost first
    ancestors: Vec<PathBuf>,
    /// Directory template names are computed relative to (the entry's directory)
    template_root: PathBuf,
    /// `None` for a dependency scan, which leaves template files unrendered
    templates: Option<&'a dyn TemplateRenderer>,
}

impl<'a> CompilationRun<'a> {
    /// Start a fresh run using `templates` for `.ejs` / `.hbs` files.
    pub fn new(templates: &'a dyn TemplateRenderer) -> Self {
        Self::with_templates(Some(templates))
    }

    /// Start a run that only discovers files.
    ///
    /// The tree has the same shape as a full build, but template files keep
    /// their raw text. Used to recover an artifact's sources without rendering.
    #[must_use]
    pub fn scan_only() -> Self {
        Self::with_templates(None)
    }

    fn with_templates(templates: Option<&'a dyn TemplateRenderer>) -> Self {
        Self {
            registry: HashSet::new(),
            ancestors: Vec::new(),
            template_root: PathBuf::new(),
            templates,
        }
    }

    /// Build the dependency tree rooted at `entry`.
    ///
    /// # Errors
    ///
    /// Any resolution, I/O, template or cycle error aborts the run and is
    /// returned; no partial tree is produced. A missing entry file is reported
    /// as [`GcpError::NotFound`].
    pub async fn build(mut self, entry: &Path) -> GcpResult<FileNode> {
        let entry = std::path::absolute(entry).map_err(|e| GcpError::io("resolving", entry, &e))?;
        self.template_root =
            canonicalize(&entry).await?.parent().map(Path::to_path_buf).unwrap_or_default();

        tracing::debug!("Building dependency tree for {}", entry.display());
        let root = self.build_node(entry, NodeKind::RequiredModule).await?;
        tracing::debug!(
            "Resolved {} node(s), {} distinct module(s) for {}",
            root.node_count(),
            self.registry.len(),
            root.path.display()
        );
        Ok(root)
    }

    fn build_node(&mut self, path: PathBuf, kind: NodeKind) -> BoxFuture<'_, GcpResult<FileNode>> {
        async move {
            let canonical = canonicalize(&path).await?;

            if let Some(start) = self.ancestors.iter().position(|p| p == &canonical) {
                let mut chain: Vec<String> =
                    self.ancestors[start..].iter().map(|p| p.display().to_string()).collect();
                chain.push(canonical.display().to_string());
                return Err(GcpError::CycleDetected {
                    chain,
                });
            }

            if kind == NodeKind::RequiredModule && !self.registry.insert(canonical.clone()) {
                tracing::debug!("Skipping duplicate require of {}", canonical.display());
                return Ok(FileNode::duplicate(canonical));
            }

            let bytes = tokio::fs::read(&canonical)
                .await
                .map_err(|e| GcpError::io("reading", &canonical, &e))?;
            let raw = String::from_utf8_lossy(&bytes).into_owned();

            let directives = parse_directives(&raw);
            let source = match self.templates {
                Some(templates) if TemplateDialect::from_path(&canonical).is_some() => {
                    templates.render(&raw, &self.template_root, &canonical)?
                }
                _ => raw,
            };

            let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
            let mut children = Vec::new();

            self.ancestors.push(canonical.clone());
            for directive in &directives {
                tracing::trace!("{}: {}", canonical.display(), directive);
                let reference = resolver::resolve(directive, &base_dir).await?;
                let child_kind = match directive.command {
                    Command::Include => NodeKind::IncludedFragment,
                    _ => NodeKind::RequiredModule,
                };

                for file in resolver::expand(&reference).await? {
                    children.push(self.build_node(file, child_kind).await?);
                }
            }
            self.ancestors.pop();

            Ok(FileNode::new(canonical, kind, source, children))
        }
        .boxed()
    }
}

/// Build the dependency tree for `entry` in a fresh [`CompilationRun`].
///
/// # Errors
///
/// See [`CompilationRun::build`].
pub async fn build_tree(entry: &Path, templates: &dyn TemplateRenderer) -> GcpResult<FileNode> {
    CompilationRun::new(templates).build(entry).await
}

async fn canonicalize(path: &Path) -> GcpResult<PathBuf> {
    tokio::fs::canonicalize(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            GcpError::NotFound {
                reference: path.display().to_string(),
                searched: path.display().to_string(),
            }
        } else {
            GcpError::io("resolving", path, &e)
        }
    })
}
