//! GCP CLI entry point
//!
//! Parses arguments, runs the selected command and renders failures as a
//! colored error report with details and suggestions:
//! - `compile` - Compile one entry file
//! - `build` - Rebuild stale outputs of the configured source directory
//! - `tree` - Show an entry's dependency tree

use anyhow::Result;
use clap::Parser;
use gcp_cli::cli;
use gcp_cli::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
