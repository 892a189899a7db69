//! The `check` subcommand.

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;

use crate::fetch::NetworkContext;
use crate::validate::{HostCheck, check_url};

/// Check that an archive URL is well-formed and its host answers.
///
/// A configuration-time convenience sharing the same redirect- and
/// proxy-aware connection logic as `install`.
#[derive(Args)]
pub struct CheckCommand {
    /// URL to validate.
    url: String,

    /// Proxy URL to route the check through.
    #[arg(long, env = "TOOLFETCH_PROXY")]
    proxy: Option<String>,
}

impl CheckCommand {
    /// Run the check; exits non-zero when the URL fails validation.
    pub async fn execute(self) -> Result<()> {
        let network = NetworkContext { proxy: self.proxy, max_redirects: None };

        match check_url(&self.url, &network).await {
            HostCheck::Ok => {
                println!("{} {}", "OK".green().bold(), self.url);
                Ok(())
            }
            HostCheck::MalformedUrl { detail } => {
                bail!("Malformed URL '{}': {detail}", self.url)
            }
            HostCheck::ConnectionFailed { detail } => {
                bail!("Could not connect to '{}': {detail}", self.url)
            }
        }
    }
}
