//! Helpers shared by the CLI commands.

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::GcpConfig;
use crate::minify::CommandMinifier;
use crate::pipeline::Pipeline;
use crate::templating::JstRenderer;
use crate::utils::fs::relative_path;

/// Template renderer configured from `gcp.toml`.
pub fn template_renderer(config: &GcpConfig) -> Arc<JstRenderer> {
    Arc::new(JstRenderer::new(config.template_namespace.clone(), config.template_dir.clone()))
}

/// Build a pipeline for `config`.
///
/// The minifier executable is only looked up when `minify` is set, so builds
/// without minification work on machines that have no minifier installed.
pub fn build_pipeline(config: &GcpConfig, manifest: Option<PathBuf>, minify: bool) -> Result<Pipeline> {
    let mut pipeline = Pipeline::new(template_renderer(config));

    if minify {
        let minifier = CommandMinifier::new(&config.minifier)?;
        pipeline = pipeline.with_minifier(Arc::new(minifier));
    }

    if let Some(manifest) = manifest {
        pipeline = pipeline.with_manifest(manifest);
    }

    Ok(pipeline)
}

/// `path` as shown to the user: relative to `cwd` when possible.
pub fn display_path(cwd: &Path, path: &Path) -> String {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };
    relative_path(cwd, &absolute)
}
