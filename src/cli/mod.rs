//! Command-line interface for toolfetch.
//!
//! Two subcommands:
//! - `install` - ensure a directory contains the unpacked contents of a
//!   remote archive, re-downloading only when the remote changed
//! - `check` - validate that a URL is well-formed and its host answers
//!
//! Global options control verbosity (`--verbose`/`--quiet`, mapped to the
//! tracing filter). Operator-facing install progress goes to stdout through
//! the log sink; diagnostics go to stderr through `tracing`.

mod check;
mod install;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Top-level CLI parser.
#[derive(Parser)]
#[command(
    name = "toolfetch",
    about = "Provision tools from remote archives",
    version,
    long_about = "toolfetch keeps a local directory in sync with a remote compressed archive, \
                  downloading only when the remote resource has changed."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug-level diagnostics on stderr.
    ///
    /// Equivalent to `RUST_LOG=debug`. Mutually exclusive with `--quiet`.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress diagnostics; only errors are reported.
    #[arg(short, long, global = true)]
    quiet: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Install (or refresh) a tool from a remote archive URL.
    Install(install::InstallCommand),

    /// Check that an archive URL is well-formed and reachable.
    Check(check::CheckCommand),
}

impl Cli {
    /// Install the tracing subscriber and dispatch to the subcommand.
    pub async fn execute(self) -> Result<()> {
        self.init_logging();

        match self.command {
            Commands::Install(cmd) => cmd.execute().await,
            Commands::Check(cmd) => cmd.execute().await,
        }
    }

    fn init_logging(&self) {
        let default_level = if self.verbose {
            "toolfetch=debug"
        } else if self.quiet {
            "error"
        } else {
            "toolfetch=info"
        };
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
        // A subscriber may already be installed when embedded in tests.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }
}
