//! The `install` subcommand.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::core::StdoutSink;
use crate::fetch::{ArchiveSource, DEFAULT_MAX_REDIRECTS, NetworkContext};
use crate::gate::InstallTarget;
use crate::installer::{InstallOutcome, Installer};

/// Ensure a local directory contains the unpacked contents of a remote
/// archive, re-downloading only when the remote has changed.
#[derive(Args)]
pub struct InstallCommand {
    /// URL of the compressed archive to install.
    url: String,

    /// Destination directory for the unpacked contents.
    ///
    /// Created on first install; wholly replaced on subsequent installs. The
    /// directory is owned by toolfetch and must not hold foreign files.
    #[arg(long)]
    dest: PathBuf,

    /// Proxy URL to route all connections through.
    #[arg(long, env = "TOOLFETCH_PROXY")]
    proxy: Option<String>,

    /// Maximum number of redirects to follow before giving up.
    #[arg(long, default_value_t = DEFAULT_MAX_REDIRECTS)]
    max_redirects: usize,
}

impl InstallCommand {
    /// Run the install operation and print the outcome.
    pub async fn execute(self) -> Result<()> {
        let network =
            NetworkContext { proxy: self.proxy, max_redirects: Some(self.max_redirects) };
        let source = ArchiveSource::parse(&self.url, network)?;
        let target = InstallTarget::new(&self.dest);

        let installer = Installer::new();
        let mut sink = StdoutSink;
        let outcome = installer.install(&target, &source, &mut sink).await?;

        match outcome {
            InstallOutcome::Installed { files_written } => {
                println!(
                    "{} {} ({files_written} file(s) in {})",
                    "Installed".green().bold(),
                    self.url,
                    self.dest.display()
                );
            }
            InstallOutcome::SkippedUnchanged | InstallOutcome::SkippedUnreachable => {
                println!("{} {} is up to date", "Unchanged".cyan().bold(), self.dest.display());
            }
        }

        Ok(())
    }
}
