//! Project configuration (`gcp.toml`).
//!
//! Configuration is optional. When no `--config` path is given, `gcp.toml` is
//! searched for in the current directory and its ancestors. Relative paths in
//! the file are resolved against the directory containing it.
//!
//! ```toml
//! source = "assets/js"
//! dest = "public/js"
//! manifest = "public/js/manifest.json"
//! template_namespace = "jst"
//! template_dir = "views"
//! minifier = ["uglifyjs"]
//! mangle = true
//! compress = true
//! ```
//!
//! # Minification Default
//!
//! When `minify` is not set, it follows the environment: `GCP_ENV` (or
//! `NODE_ENV` when `GCP_ENV` is unset) equal to `development`, or both unset,
//! disables minification. Any other value enables it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::constants::{
    CONFIG_FILE_NAME, DEFAULT_MINIFIER, DEFAULT_TEMPLATE_NAMESPACE, ENV_VAR, FALLBACK_ENV_VAR,
};
use crate::core::GcpError;
use crate::pipeline::CompileOptions;
use crate::utils::fs::find_upwards;

/// Contents of `gcp.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GcpConfig {
    /// Directory entries are read from by `gcp build`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,

    /// Directory compiled outputs are written to by `gcp build`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<PathBuf>,

    /// Produce minified output; unset means decided by the environment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minify: Option<bool>,

    /// Let the minifier rename identifiers
    #[serde(default = "default_true")]
    pub mangle: bool,

    /// Let the minifier compress expressions
    #[serde(default = "default_true")]
    pub compress: bool,

    /// Rebuild even when outputs are fresh
    #[serde(default)]
    pub force: bool,

    /// Global object compiled templates are registered on
    #[serde(default = "default_template_namespace")]
    pub template_namespace: String,

    /// Directory template names are relative to, below the entry's directory
    #[serde(default)]
    pub template_dir: String,

    /// Manifest file recording each output's dependency tree
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<PathBuf>,

    /// Minifier executable followed by its arguments
    #[serde(default = "default_minifier")]
    pub minifier: Vec<String>,

    /// Directory relative paths are resolved against
    #[serde(skip)]
    pub root: PathBuf,
}

fn default_true() -> bool {
    true
}

fn default_template_namespace() -> String {
    DEFAULT_TEMPLATE_NAMESPACE.to_string()
}

fn default_minifier() -> Vec<String> {
    vec![DEFAULT_MINIFIER.to_string()]
}

impl Default for GcpConfig {
    fn default() -> Self {
        Self {
            source: None,
            dest: None,
            minify: None,
            mangle: true,
            compress: true,
            force: false,
            template_namespace: default_template_namespace(),
            template_dir: String::new(),
            manifest: None,
            minifier: default_minifier(),
            root: PathBuf::new(),
        }
    }
}

impl GcpConfig {
    /// Load configuration from a specific file.
    ///
    /// Relative `source`, `dest` and `manifest` paths are made absolute against
    /// the file's directory.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not valid configuration.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        let root = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        config.root = std::path::absolute(&root)
            .with_context(|| format!("Failed to resolve {}", root.display()))?;
        config.resolve_paths();

        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load the configuration for a command.
    ///
    /// An explicit path must exist. Otherwise `gcp.toml` is searched from `cwd`
    /// upwards, falling back to defaults rooted at `cwd`.
    ///
    /// # Errors
    ///
    /// Returns [`GcpError::Config`] if an explicit path does not exist, or any
    /// error from [`GcpConfig::load_from`].
    pub async fn load(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(GcpError::Config {
                    message: format!("configuration file not found: {}", path.display()),
                }
                .into());
            }
            return Self::load_from(path).await;
        }

        match find_upwards(cwd, CONFIG_FILE_NAME) {
            Some(path) => Self::load_from(&path).await,
            None => {
                tracing::debug!("No {} found, using defaults", CONFIG_FILE_NAME);
                Ok(Self {
                    root: cwd.to_path_buf(),
                    ..Self::default()
                })
            }
        }
    }

    fn resolve_paths(&mut self) {
        for path in [&mut self.source, &mut self.dest, &mut self.manifest].into_iter().flatten() {
            if path.is_relative() {
                *path = self.root.join(&*path);
            }
        }
    }

    /// The configured source directory.
    ///
    /// # Errors
    ///
    /// Returns [`GcpError::Config`] if `source` is not configured.
    pub fn source_dir(&self) -> Result<&Path, GcpError> {
        self.source.as_deref().ok_or_else(|| GcpError::Config {
            message: "'source' directory is not configured".to_string(),
        })
    }

    /// The configured destination directory.
    ///
    /// # Errors
    ///
    /// Returns [`GcpError::Config`] if `dest` is not configured.
    pub fn dest_dir(&self) -> Result<&Path, GcpError> {
        self.dest.as_deref().ok_or_else(|| GcpError::Config {
            message: "'dest' directory is not configured".to_string(),
        })
    }

    /// Whether output should be minified, consulting the environment when unset.
    #[must_use]
    pub fn minify_enabled(&self) -> bool {
        self.minify.unwrap_or_else(|| {
            minify_from_env(std::env::var(ENV_VAR).ok(), std::env::var(FALLBACK_ENV_VAR).ok())
        })
    }

    /// Compile options derived from this configuration.
    #[must_use]
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            force: self.force,
            minify: self.minify_enabled(),
            mangle: self.mangle,
            compress: self.compress,
        }
    }
}

/// Minification default from `GCP_ENV` / `NODE_ENV` values.
///
/// The first variable wins when set; `development` or nothing means no minification.
#[must_use]
pub fn minify_from_env(primary: Option<String>, fallback: Option<String>) -> bool {
    match primary.or(fallback) {
        None => false,
        Some(env) => env != "development",
    }
}
