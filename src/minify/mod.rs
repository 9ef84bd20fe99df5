//! Minifier collaborator.
//!
//! Minification is delegated to an external JavaScript minifier. The compiled
//! script is written to the minifier's stdin and the minified script read back
//! from its stdout. Any executable following that convention works:
//!
//! ```toml
//! # gcp.toml
//! minifier = ["uglifyjs"]
//! # or
//! minifier = ["esbuild", "--minify", "--log-level=warning"]
//! ```
//!
//! `--compress` and `--mangle` are appended to the configured arguments when the
//! corresponding [`MinifyOptions`] are enabled.

use futures::future::{BoxFuture, FutureExt};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::constants::DEFAULT_MINIFIER;
use crate::core::{GcpError, GcpResult};

/// What the minifier may do to the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinifyOptions {
    /// Rename local identifiers
    pub mangle_names: bool,
    /// Apply expression-level compression
    pub compress_expressions: bool,
}

impl Default for MinifyOptions {
    fn default() -> Self {
        Self {
            mangle_names: true,
            compress_expressions: true,
        }
    }
}

/// Shrinks compiled script text.
pub trait Minifier: Send + Sync {
    /// Minify `code`.
    ///
    /// # Errors
    ///
    /// Returns [`GcpError::Minify`] if the code cannot be minified.
    fn minify<'a>(&'a self, code: &'a str, options: MinifyOptions) -> BoxFuture<'a, GcpResult<String>>;
}

/// Minifier backed by an external executable.
#[derive(Debug, Clone)]
pub struct CommandMinifier {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandMinifier {
    /// Locate `command[0]` on `PATH` and keep the remaining entries as arguments.
    ///
    /// An empty command means the default minifier (`uglifyjs`).
    ///
    /// # Errors
    ///
    /// Returns [`GcpError::MinifierNotFound`] if the executable cannot be found.
    pub fn new(command: &[String]) -> GcpResult<Self> {
        let (name, args) = match command.split_first() {
            Some((name, args)) => (name.as_str(), args.to_vec()),
            None => (DEFAULT_MINIFIER, Vec::new()),
        };

        let program = which::which(name).map_err(|_| GcpError::MinifierNotFound {
            command: name.to_string(),
        })?;

        tracing::debug!("Using minifier {}", program.display());
        Ok(Self {
            program,
            args,
        })
    }

    /// Full argument list for one invocation.
    fn arguments(&self, options: MinifyOptions) -> Vec<String> {
        let mut args = self.args.clone();
        if options.compress_expressions {
            args.push("--compress".to_string());
        }
        if options.mangle_names {
            args.push("--mangle".to_string());
        }
        args
    }

    async fn run(&self, code: &str, options: MinifyOptions) -> GcpResult<String> {
        let args = self.arguments(options);
        tracing::debug!("Executing minifier: {} {}", self.program.display(), args.join(" "));

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| minify_error(format!("failed to start {}: {e}", self.program.display())))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| minify_error("minifier stdin unavailable".to_string()))?;
        let input = code.to_owned();
        let writer = tokio::spawn(async move {
            let result = stdin.write_all(input.as_bytes()).await;
            drop(stdin);
            result
        });

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| minify_error(format!("failed to run {}: {e}", self.program.display())))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::debug!("Minifier failed with exit code: {:?}", output.status.code());
            return Err(minify_error(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        match writer.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(minify_error(format!("failed to write minifier input: {e}"))),
            Err(e) => return Err(minify_error(format!("minifier input task failed: {e}"))),
        }

        String::from_utf8(output.stdout)
            .map_err(|e| minify_error(format!("minifier produced invalid UTF-8: {e}")))
    }
}

impl Minifier for CommandMinifier {
    fn minify<'a>(&'a self, code: &'a str, options: MinifyOptions) -> BoxFuture<'a, GcpResult<String>> {
        self.run(code, options).boxed()
    }
}

fn minify_error(reason: String) -> GcpError {
    GcpError::Minify {
        reason,
    }
}
