//! Best-effort host validation, independent of installing.
//!
//! Configuration-time convenience: given a candidate URL string, check that
//! it parses and that the host answers. Shares the redirect- and proxy-aware
//! connection logic of [`crate::fetch::Fetcher`], so a URL that validates
//! here will be reached the same way during an install.

use reqwest::Url;

use crate::fetch::{Fetcher, NetworkContext};

/// Outcome of a host liveness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCheck {
    /// The URL parses and the host answered with a success status.
    Ok,
    /// The URL string could not be parsed.
    MalformedUrl {
        /// Parser error detail
        detail: String,
    },
    /// The host could not be reached, or answered with a non-success status.
    ConnectionFailed {
        /// What went wrong, for display to the user
        detail: String,
    },
}

impl HostCheck {
    /// Whether the check passed.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// Check that `raw` is a well-formed URL whose host currently answers.
///
/// Never returns an error: every failure mode is folded into the
/// [`HostCheck`] value.
pub async fn check_url(raw: &str, network: &NetworkContext) -> HostCheck {
    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(e) => return HostCheck::MalformedUrl { detail: e.to_string() },
    };

    let fetcher = match Fetcher::new(network) {
        Ok(fetcher) => fetcher,
        Err(e) => return HostCheck::ConnectionFailed { detail: e.to_string() },
    };

    match fetcher.probe(&url, None).await {
        Ok(metadata) if metadata.status.is_success() => HostCheck::Ok,
        Ok(metadata) => HostCheck::ConnectionFailed {
            detail: format!("server rejected connection: {}", metadata.status),
        },
        Err(e) => HostCheck::ConnectionFailed { detail: e.to_string() },
    }
}
