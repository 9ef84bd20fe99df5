//! Core types for GCP
//!
//! This module holds the error taxonomy shared by every stage of the pipeline.
//! See [`error`] for the variants and the CLI presentation helpers.
//!
//! # Modules
//!
//! - `error` - [`GcpError`], [`ErrorContext`] and [`user_friendly_error`]

pub mod error;

pub use error::{ErrorContext, GcpError, user_friendly_error};

/// Result alias for operations that fail with a [`GcpError`].
pub type GcpResult<T> = std::result::Result<T, GcpError>;
