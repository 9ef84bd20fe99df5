//! Error handling for GCP
//!
//! This module provides the error taxonomy of the pipeline and user-friendly error
//! reporting for the command-line driver. The error system follows two principles:
//! 1. **Strongly-typed errors** so callers can decide how to present a failure
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`GcpError`] - Enumerated error types for every failure of a compilation run
//! - [`ErrorContext`] - Wrapper that adds details and suggestions for display
//!
//! # Recoverable vs fatal errors
//!
//! A request-serving driver treats [`GcpError::NotFound`] and
//! [`GcpError::MissingDirectory`] as "no such asset" and falls through to a
//! not-found response, while I/O and minifier failures are faults. Use
//! [`GcpError::is_recoverable`] to make that decision. In the one-shot command
//! context every error is fatal and reported through [`user_friendly_error`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use gcp_cli::core::{GcpError, ErrorContext};
//!
//! let error = GcpError::NotFound {
//!     reference: "vendor/jquery".to_string(),
//!     searched: "/app/src/vendor/jquery".to_string(),
//! };
//! assert!(error.is_recoverable());
//!
//! let context = ErrorContext::new(error)
//!     .with_suggestion("Check the spelling of the require directive");
//! context.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use crate::constants::SUPPORTED_EXTENSIONS;

/// Failures of a compilation run.
///
/// Every variant aborts the run that produced it: no artifact is written and
/// no manifest entry is committed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GcpError {
    /// A `require` or `include` argument matched no file with a supported extension
    #[error("Module '{reference}' not found (looked for {searched} with extensions {})", SUPPORTED_EXTENSIONS.join(", "))]
    NotFound {
        reference: String,
        searched: String,
    },

    /// A `require_directory` or `require_tree` target does not exist
    #[error("Directory '{path}' not found")]
    MissingDirectory {
        path: String,
    },

    /// Reading or writing a file failed
    #[error("I/O error while {operation} '{path}': {reason}")]
    Io {
        operation: String,
        path: String,
        reason: String,
    },

    /// The template collaborator rejected a template file
    #[error("Failed to render template '{path}': {reason}")]
    TemplateRender {
        path: String,
        reason: String,
    },

    /// The minifier collaborator failed
    #[error("Minification failed: {reason}")]
    Minify {
        reason: String,
    },

    /// The configured minifier executable could not be located
    #[error("Minifier executable '{command}' not found in PATH")]
    MinifierNotFound {
        command: String,
    },

    /// A file transitively requires or includes itself
    #[error("Circular dependency detected: {}", .chain.join(" -> "))]
    CycleDetected {
        chain: Vec<String>,
    },

    /// Invalid or incomplete configuration
    #[error("Configuration error: {message}")]
    Config {
        message: String,
    },

    /// Anything else, with the full error chain in the message
    #[error("{message}")]
    Other {
        message: String,
    },
}

impl GcpError {
    /// Build an [`GcpError::Io`] from an I/O error and the path being accessed.
    pub fn io(operation: &str, path: &std::path::Path, error: &std::io::Error) -> Self {
        Self::Io {
            operation: operation.to_string(),
            path: path.display().to_string(),
            reason: error.to_string(),
        }
    }

    /// Whether a request-serving driver should treat this error as "asset not found".
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::MissingDirectory { .. })
    }
}

/// Error wrapper carrying user-facing details and suggestions.
///
/// Construct one with [`ErrorContext::new`] and the builder methods, or let
/// [`user_friendly_error`] pick suggestions for a [`GcpError`].
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying GCP error
    pub error: GcpError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: GcpError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with suggestions for the CLI.
///
/// [`GcpError`] values anywhere in the chain get tailored suggestions; I/O and
/// TOML errors are mapped onto the closest variant; everything else becomes
/// [`GcpError::Other`] with the full cause chain in its message.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(gcp_error) = error.chain().find_map(|cause| cause.downcast_ref::<GcpError>()) {
        return create_error_context(gcp_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(GcpError::Io {
                    operation: "accessing".to_string(),
                    path: "unknown".to_string(),
                    reason: io_error.to_string(),
                })
                .with_suggestion("Check file ownership and permissions of the source and destination directories");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(GcpError::Io {
                    operation: "accessing".to_string(),
                    path: "unknown".to_string(),
                    reason: io_error.to_string(),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(GcpError::Config {
            message: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax in your gcp.toml file")
        .with_details("Configuration keys: source, dest, minify, mangle, compress, force, template_namespace, template_dir, manifest, minifier");
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(GcpError::Other {
        message,
    })
}

fn create_error_context(error: GcpError) -> ErrorContext {
    match &error {
        GcpError::NotFound { .. } => ErrorContext::new(error)
            .with_suggestion("Check the directive path; it is resolved relative to the directory of the file that declares it")
            .with_details(format!(
                "Extensions are probed in order ({}) and the first existing file wins",
                SUPPORTED_EXTENSIONS.join(", ")
            )),

        GcpError::MissingDirectory { .. } => ErrorContext::new(error)
            .with_suggestion("Create the directory or fix the require_directory/require_tree argument"),

        GcpError::Io { .. } => ErrorContext::new(error)
            .with_suggestion("Check file permissions and available disk space"),

        GcpError::TemplateRender { .. } => ErrorContext::new(error)
            .with_suggestion("Check the template file for syntax errors")
            .with_details("Files ending in .ejs or .hbs are compiled into JST registrations before concatenation"),

        GcpError::Minify { .. } => ErrorContext::new(error)
            .with_suggestion("Run the concatenated output through the minifier manually to locate the syntax error")
            .with_details("The minifier only runs when --minify is set or the environment is not 'development'"),

        GcpError::MinifierNotFound { command } => {
            let suggestion = format!(
                "Install '{command}' (for example 'npm install -g uglify-js') or set 'minifier' in gcp.toml"
            );
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        GcpError::CycleDetected { .. } => ErrorContext::new(error)
            .with_suggestion("Remove one of the directives forming the cycle")
            .with_details("A file may not require or include itself, directly or through its dependencies"),

        GcpError::Config { .. } => ErrorContext::new(error)
            .with_suggestion("Check gcp.toml or pass --config with the path to a valid configuration file"),

        GcpError::Other { .. } => ErrorContext::new(error),
    }
}
