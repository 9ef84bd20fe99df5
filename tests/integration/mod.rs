//! Integration test suite for GCP
//!
//! End-to-end tests driving the library pipeline and the `gcp` binary against
//! temporary source trees.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **bundling**: ordering, duplicate suppression, directory/tree expansion, templates
//! - **staleness**: cached vs rebuilt decisions across source changes
//! - **manifest**: manifest file contents and concurrent updates
//! - **cli**: the `gcp` binary (compile, build, tree, error reports)

mod bundling;
mod cli;
mod manifest;
mod staleness;
