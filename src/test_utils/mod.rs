//! Test utilities for GCP
//!
//! Helpers for unit and integration tests: a throwaway source tree
//! ([`TestEnvironment`]) and one-time logging setup.
//!
//! # Example
//!
//! ```rust,no_run
//! use gcp_cli::test_utils::TestEnvironment;
//!
//! let env = TestEnvironment::new().unwrap();
//! env.write_source("app.js", "// = require foo\nvar app = 1;\n").unwrap();
//! env.write_source("foo.js", "var foo = 2;\n").unwrap();
//! assert!(env.source_path("app.js").exists());
//! ```

pub mod environment;

pub use environment::TestEnvironment;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call takes effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=gcp_cli=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}
