//! Network retrieval: redirect-following, proxy-aware, conditional-GET aware.
//!
//! [`Fetcher`] wraps a single `reqwest` client used for both the freshness
//! probe and the real download, so proxy configuration is honored uniformly
//! and never bypassed. The fetcher exposes protocol-level facts
//! ([`RemoteMetadata`]: status code and raw `Last-Modified` header) without
//! interpreting them; interpretation is the job of [`crate::gate`].
//!
//! Redirects are followed up to a configurable bound (default
//! [`DEFAULT_MAX_REDIRECTS`]); exceeding it fails with
//! [`ToolfetchError::TooManyRedirects`] instead of looping. Mid-stream read
//! failures surface as [`ToolfetchError::PartialRead`] carrying
//! bytes-read-so-far against the advertised length.

use std::fs::File;
use std::io::Write;

use futures::StreamExt;
use reqwest::header;
use reqwest::redirect;
use reqwest::{Client, Proxy, Response, StatusCode, Url};
use tracing::debug;

use crate::core::{Result, ToolfetchError};

/// Default bound on the number of redirects followed per request.
pub const DEFAULT_MAX_REDIRECTS: usize = 20;

/// Network configuration supplied by the caller.
///
/// Proxy awareness is a parameter, not a global: the same context applies to
/// the probe and the real download of one install operation.
#[derive(Debug, Clone, Default)]
pub struct NetworkContext {
    /// Proxy URL routed through for all connections, when set. When absent,
    /// the standard proxy environment variables still apply.
    pub proxy: Option<String>,
    /// Redirect bound override; [`DEFAULT_MAX_REDIRECTS`] when absent.
    pub max_redirects: Option<usize>,
}

impl NetworkContext {
    /// The effective redirect bound.
    #[must_use]
    pub fn redirect_limit(&self) -> usize {
        self.max_redirects.unwrap_or(DEFAULT_MAX_REDIRECTS)
    }
}

/// Immutable descriptor of where an archive comes from.
#[derive(Debug, Clone)]
pub struct ArchiveSource {
    /// The archive URL.
    pub url: Url,
    /// Proxy/redirect context used for every connection to this source.
    pub network: NetworkContext,
}

impl ArchiveSource {
    /// Parse a source from a raw URL string.
    ///
    /// Fails with [`ToolfetchError::MalformedSource`] when the string is not
    /// an absolute URL.
    pub fn parse(raw: &str, network: NetworkContext) -> Result<Self> {
        let url = Url::parse(raw).map_err(|e| ToolfetchError::MalformedSource {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { url, network })
    }
}

/// Remote facts observed on one request. Never persisted except via the
/// timestamp marker after a successful install.
#[derive(Debug, Clone)]
pub struct RemoteMetadata {
    /// Protocol-level response status, uninterpreted.
    pub status: StatusCode,
    /// Raw `Last-Modified` header value, when the server sent one.
    pub last_modified: Option<String>,
}

/// Redirect-following, proxy-aware HTTP retriever.
pub struct Fetcher {
    client: Client,
    redirect_limit: usize,
}

impl Fetcher {
    /// Build a fetcher for the given network context.
    ///
    /// Fails with [`ToolfetchError::MalformedSource`] when the configured
    /// proxy URL is invalid, or [`ToolfetchError::ConnectionFailed`] when the
    /// client cannot be constructed.
    pub fn new(network: &NetworkContext) -> Result<Self> {
        let redirect_limit = network.redirect_limit();
        let mut builder = Client::builder()
            .user_agent(concat!("toolfetch/", env!("CARGO_PKG_VERSION")))
            .redirect(redirect::Policy::limited(redirect_limit));

        if let Some(proxy_url) = &network.proxy {
            let proxy = Proxy::all(proxy_url).map_err(|e| ToolfetchError::MalformedSource {
                url: proxy_url.clone(),
                reason: format!("invalid proxy: {e}"),
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().map_err(|e| ToolfetchError::ConnectionFailed {
            url: String::new(),
            reason: format!("failed to build HTTP client: {e}"),
        })?;

        Ok(Self { client, redirect_limit })
    }

    /// Probe the source with an optional `If-Modified-Since` condition.
    ///
    /// Returns the response metadata without reading the body. Any response
    /// the server produces, including non-success statuses, yields
    /// `Ok(RemoteMetadata)`; only transport-level failures error.
    pub async fn probe(
        &self,
        url: &Url,
        if_modified_since: Option<&str>,
    ) -> Result<RemoteMetadata> {
        let mut request = self.client.get(url.clone());
        if let Some(condition) = if_modified_since {
            request = request.header(header::IF_MODIFIED_SINCE, condition);
        }
        let response = request.send().await.map_err(|e| self.classify(url, e))?;
        let metadata = Self::metadata(&response);
        debug!(status = %metadata.status, url = %url, "probe response");
        Ok(metadata)
    }

    /// Download the archive body into `spool`, returning the response
    /// metadata and the number of bytes written.
    ///
    /// The body is streamed chunk by chunk; a mid-stream failure or a body
    /// shorter than the advertised `Content-Length` fails with
    /// [`ToolfetchError::PartialRead`]. A non-success status fails with
    /// [`ToolfetchError::ServerRejected`] before any bytes are spooled.
    pub async fn download(&self, url: &Url, spool: &mut File) -> Result<(RemoteMetadata, u64)> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.classify(url, e))?;
        let metadata = Self::metadata(&response);

        if !metadata.status.is_success() {
            return Err(ToolfetchError::ServerRejected {
                url: url.to_string(),
                status: metadata.status.as_u16(),
                message: metadata.status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let expected = response.content_length();
        let mut stream = response.bytes_stream();
        let mut bytes_read: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    debug!(bytes_read, ?expected, error = %e, "download stream failed");
                    return Err(ToolfetchError::PartialRead { bytes_read, expected });
                }
            };
            spool.write_all(&chunk)?;
            bytes_read += chunk.len() as u64;
        }

        if let Some(total) = expected {
            if bytes_read != total {
                return Err(ToolfetchError::PartialRead { bytes_read, expected: Some(total) });
            }
        }

        spool.flush()?;
        debug!(bytes_read, url = %url, "download complete");
        Ok((metadata, bytes_read))
    }

    fn metadata(response: &Response) -> RemoteMetadata {
        RemoteMetadata {
            status: response.status(),
            last_modified: response
                .headers()
                .get(header::LAST_MODIFIED)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        }
    }

    fn classify(&self, url: &Url, err: reqwest::Error) -> ToolfetchError {
        if err.is_redirect() {
            ToolfetchError::TooManyRedirects {
                url: url.to_string(),
                limit: self.redirect_limit,
            }
        } else {
            ToolfetchError::ConnectionFailed {
                url: url.to_string(),
                reason: err.to_string(),
            }
        }
    }
}
