//! Command-line interface for GCP.
//!
//! # Available Commands
//!
//! - `compile` - Compile one entry file into `.dist.js` and/or `.min.js` outputs
//! - `build` - Rebuild stale outputs for entries of the configured source directory
//! - `tree` - Print the resolved dependency tree of an entry file
//!
//! # Command Usage Patterns
//!
//! ```bash
//! # Concatenate app.js and its dependencies into app.dist.js
//! gcp compile assets/js/app.js
//!
//! # Write both public/app.dist.js and public/app.min.js
//! gcp compile assets/js/app.js public/app.js --all
//!
//! # Rebuild everything under `source` into `dest` (from gcp.toml)
//! gcp build
//! gcp build app.js admin.js --force
//!
//! # Inspect what an entry pulls in
//! gcp tree assets/js/app.js
//! ```
//!
//! # Global Options
//!
//! - `--verbose` / `-v`: debug logging
//! - `--quiet` / `-q`: errors only
//! - `--config` / `-c`: explicit `gcp.toml`
//!
//! Log output goes to stderr; command results go to stdout. `RUST_LOG` is honored
//! when neither `--verbose` nor `--quiet` is given.

mod build;
mod common;
mod compile;
mod tree;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::GcpConfig;

pub use build::BuildCommand;
pub use compile::CompileCommand;
pub use tree::TreeCommand;

/// Settings derived from the global flags, applied once before a command runs.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter directive; `None` defers to `RUST_LOG`, then `info`
    pub log_level: Option<String>,

    /// Explicit configuration file
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The log filter to install.
    #[must_use]
    pub fn env_filter(&self) -> EnvFilter {
        match &self.log_level {
            Some(level) => EnvFilter::new(level),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        }
    }

    /// Install the global tracing subscriber writing to stderr.
    ///
    /// Only the first call in a process takes effect.
    pub fn init_logging(&self) {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(self.env_filter())
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Directive-driven JavaScript concatenation, templating and minification.
#[derive(Parser, Debug)]
#[command(
    name = "gcp",
    about = "Compile directive-driven JavaScript bundles",
    version,
    long_about = "GCP resolves `// = require` style header directives, concatenates the \
                  dependency tree in dependency-first order, compiles .ejs/.hbs templates \
                  into JST registrations and optionally minifies the result."
)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to gcp.toml (default: searched from the current directory upwards)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile an entry file and its dependencies.
    ///
    /// See [`compile::CompileCommand`] for options.
    Compile(CompileCommand),

    /// Rebuild stale outputs for entries of the configured source directory.
    ///
    /// See [`build::BuildCommand`] for options.
    Build(BuildCommand),

    /// Print the resolved dependency tree of an entry file.
    ///
    /// See [`tree::TreeCommand`] for options.
    Tree(TreeCommand),
}

impl Cli {
    /// Execute the CLI with configuration built from the global flags.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Translate the global flags into a [`CliConfig`].
    ///
    /// `--verbose` selects `debug`, `--quiet` selects `error`, neither leaves the
    /// choice to `RUST_LOG`.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            None
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
        }
    }

    /// Execute the CLI with an explicit [`CliConfig`].
    pub async fn execute_with_config(self, cli_config: CliConfig) -> Result<()> {
        cli_config.init_logging();

        let cwd = std::env::current_dir().context("Failed to determine the current directory")?;
        let config = GcpConfig::load(cli_config.config_path.as_deref(), &cwd).await?;

        match self.command {
            Commands::Compile(cmd) => cmd.execute(&config, &cwd).await,
            Commands::Build(cmd) => cmd.execute(&config).await,
            Commands::Tree(cmd) => cmd.execute(&config, &cwd).await,
        }
    }
}
