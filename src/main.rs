//! toolfetch CLI entry point.
//!
//! Parses command-line arguments, runs the requested subcommand, and renders
//! failures as user-friendly errors with suggestions.

use anyhow::Result;
use clap::Parser;
use toolfetch::cli;
use toolfetch::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let context = user_friendly_error(e);
            context.display();
            std::process::exit(1);
        }
    }
}
