//! GCP - directive-driven JavaScript concatenation
//!
//! GCP builds JavaScript bundles from source files that declare their
//! dependencies in a leading comment header:
//!
//! ```javascript
//! // = require vendor/jquery
//! // = require_tree ./widgets
//! // = include partials/banner
//! var app = {};
//! ```
//!
//! The entry file's dependency tree is resolved recursively and concatenated in
//! dependency-first order. Each `require`d module appears at most once per
//! output, while `include`d fragments are repeated at every reference point.
//! Underscore (`.ejs`) and Handlebars (`.hbs`) templates take part in the tree and
//! are emitted as JST registrations. The result can be passed through an external
//! minifier and is rebuilt only when one of its files changes.
//!
//! # Core Modules
//!
//! ## Resolution
//! - [`directive`] - Header directive parsing
//! - [`resolver`] - Turning directive arguments into files
//! - [`graph`] - Recursive dependency tree construction with duplicate suppression
//!
//! ## Output
//! - [`render`] - Banner-separated concatenation of a tree
//! - [`templating`] - `.ejs` / `.hbs` to JST registration scripts
//! - [`minify`] - External minifier collaborator
//! - [`manifest`] - Persisted dependency trees per output
//!
//! ## Driving
//! - [`pipeline`] - Compilation and staleness-gated rebuilds
//! - [`cache`] - Staleness decisions and the build record
//! - [`config`] - `gcp.toml`
//! - [`cli`] - The `gcp` command
//!
//! ## Supporting Modules
//! - [`core`] - Error types and CLI error presentation
//! - [`utils`] - Atomic writes and path helpers
//! - [`constants`] - Extensions, suffixes and defaults
//!
//! # Example
//!
//! ```rust,no_run
//! use gcp_cli::pipeline::{CompileOptions, Pipeline};
//! use gcp_cli::templating::JstRenderer;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let pipeline = Pipeline::new(Arc::new(JstRenderer::default()));
//! pipeline
//!     .compile(Path::new("assets/js/app.js"), Path::new("public/app.js"), CompileOptions::default())
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod directive;
pub mod graph;
pub mod manifest;
pub mod minify;
pub mod pipeline;
pub mod render;
pub mod resolver;
pub mod templating;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
