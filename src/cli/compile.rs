//! One-shot compilation of an entry file.
//!
//! ```bash
//! gcp compile assets/js/app.js                 # assets/js/app.dist.js
//! gcp compile assets/js/app.js public/app.js   # public/app.dist.js
//! gcp compile assets/js/app.js --min           # assets/js/app.min.js
//! gcp compile assets/js/app.js --all           # both
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};

use super::common::{build_pipeline, display_path};
use crate::config::GcpConfig;
use crate::constants::{DIST_SUFFIX, MIN_SUFFIX};
use crate::minify::MinifyOptions;
use crate::resolver::strip_supported_extension;

/// Compile an entry file and its dependencies.
#[derive(Args, Debug)]
pub struct CompileCommand {
    /// Entry file
    file: PathBuf,

    /// Destination; its directory and base name (without `.js`) name the outputs.
    /// Defaults to the entry file itself.
    dest: Option<PathBuf>,

    /// Write minified output (`.min.js`) instead of concatenated output
    #[arg(long, visible_alias = "min")]
    minify: bool,

    /// Write both concatenated and minified output
    #[arg(long)]
    all: bool,

    /// Do not let the minifier rename identifiers
    #[arg(long)]
    no_mangle: bool,

    /// Do not let the minifier compress expressions
    #[arg(long)]
    no_compress: bool,

    /// Record the dependency tree in this manifest file
    #[arg(long)]
    manifest: Option<PathBuf>,
}

impl CompileCommand {
    /// Run the command.
    pub async fn execute(self, config: &GcpConfig, cwd: &Path) -> Result<()> {
        let write_min = self.minify || self.all;
        let write_dist = !self.minify || self.all;

        let manifest = self.manifest.clone().or_else(|| config.manifest.clone());
        let pipeline = build_pipeline(config, manifest, write_min)?;

        let entry = absolute(cwd, &self.file);
        let stem = absolute(cwd, &self.output_stem());
        let tree = pipeline.build_tree(&entry).await?;

        if write_dist {
            let dest = with_suffix(&stem, DIST_SUFFIX);
            pipeline.emit(&tree, &dest, None).await?;
            println!("{} to '{}'", "Compiled".green(), display_path(cwd, &dest));
        }

        if write_min {
            let dest = with_suffix(&stem, MIN_SUFFIX);
            let options = MinifyOptions {
                mangle_names: config.mangle && !self.no_mangle,
                compress_expressions: config.compress && !self.no_compress,
            };
            pipeline.emit(&tree, &dest, Some(options)).await?;
            println!("{} to '{}'", "Minified".green(), display_path(cwd, &dest));
        }

        Ok(())
    }

    /// Output path without suffix: `DEST` (or `FILE`) minus its script extension.
    fn output_stem(&self) -> PathBuf {
        let base = self.dest.as_ref().unwrap_or(&self.file);
        let name = base.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        base.with_file_name(strip_supported_extension(&name))
    }
}

fn absolute(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

fn with_suffix(stem: &Path, suffix: &str) -> PathBuf {
    let mut path = stem.as_os_str().to_owned();
    path.push(suffix);
    PathBuf::from(path)
}
