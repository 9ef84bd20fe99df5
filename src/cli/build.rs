//! Incremental builds of the configured source directory.
//!
//! Each entry `ENTRY` maps `source/ENTRY` to `dest/ENTRY` (`source` and `dest`
//! come from `gcp.toml`). Entries are compiled concurrently; each reports
//! whether its output was reused or rebuilt:
//!
//! ```text
//! rebuilt app.js
//! cached  admin.js
//! ```
//!
//! Entries whose name contains `_skip` are ignored. A missing entry or
//! dependency is reported and the remaining entries still build; any other
//! failure aborts the command.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;

use super::common::build_pipeline;
use crate::config::GcpConfig;
use crate::constants::SKIP_MARKER;
use crate::core::GcpError;
use crate::pipeline::{BuildStatus, CompileOptions};

/// Rebuild stale outputs for entries of the configured source directory.
#[derive(Args, Debug)]
pub struct BuildCommand {
    /// Entries relative to the source directory (default: every top-level `.js` file)
    entries: Vec<String>,

    /// Rebuild even when outputs are fresh
    #[arg(long)]
    force: bool,

    /// Minify outputs regardless of configuration
    #[arg(long, conflicts_with = "dev")]
    minify: bool,

    /// Never minify outputs
    #[arg(long)]
    dev: bool,
}

impl BuildCommand {
    /// Run the command.
    pub async fn execute(self, config: &GcpConfig) -> Result<()> {
        let source = config.source_dir()?.to_path_buf();
        let dest = config.dest_dir()?.to_path_buf();
        let options = self.options(config);

        let entries = if self.entries.is_empty() {
            discover_entries(&source).await?
        } else {
            self.entries.clone()
        };
        let entries: Vec<String> =
            entries.into_iter().filter(|entry| !entry.contains(SKIP_MARKER)).collect();

        if entries.is_empty() {
            println!("No entries to build in {}", source.display());
            return Ok(());
        }

        let pipeline = Arc::new(build_pipeline(config, config.manifest.clone(), options.minify)?);

        let mut tasks = Vec::with_capacity(entries.len());
        for entry in &entries {
            let pipeline = Arc::clone(&pipeline);
            let input = source.join(entry);
            let output = dest.join(entry);
            tasks.push(tokio::spawn(async move {
                pipeline.resolve_and_check(&input, &output, options).await
            }));
        }

        let mut failed = 0usize;
        for (entry, task) in entries.iter().zip(tasks) {
            let result = task.await.context("Build task panicked")?;
            match result {
                Ok(BuildStatus::Rebuilt) => println!("{} {}", "rebuilt".green(), entry),
                Ok(BuildStatus::Cached) => println!("{}  {}", "cached".bright_black(), entry),
                Err(e) if is_recoverable(&e) => {
                    failed += 1;
                    tracing::warn!("Skipping {}: {}", entry, e);
                    eprintln!("{} {}: {}", "missing".yellow(), entry, e);
                }
                Err(e) => return Err(e.context(format!("Failed to build {entry}"))),
            }
        }

        if failed > 0 {
            tracing::warn!("{} of {} entries could not be built", failed, entries.len());
        }
        Ok(())
    }

    fn options(&self, config: &GcpConfig) -> CompileOptions {
        let mut options = config.compile_options();
        options.force |= self.force;
        if self.minify {
            options.minify = true;
        }
        if self.dev {
            options.minify = false;
        }
        options
    }
}

fn is_recoverable(error: &anyhow::Error) -> bool {
    error.downcast_ref::<GcpError>().is_some_and(GcpError::is_recoverable)
}

/// Top-level `.js` files of `source`, sorted by name.
async fn discover_entries(source: &Path) -> Result<Vec<String>> {
    let mut dir = tokio::fs::read_dir(source).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            anyhow::Error::new(GcpError::MissingDirectory {
                path: source.display().to_string(),
            })
        } else {
            anyhow::Error::new(GcpError::io("listing", source, &e))
        }
    })?;

    let mut entries = Vec::new();
    while let Some(entry) = dir.next_entry().await? {
        let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_file && name.ends_with(".js") {
            entries.push(name);
        }
    }
    entries.sort();
    Ok(entries)
}
