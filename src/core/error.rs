//! Error handling for toolfetch
//!
//! This module provides the error types and user-friendly error reporting for
//! the fetch-and-install engine. The error system follows two principles:
//! 1. **Strongly-typed errors** so callers can react to specific failure modes
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`ToolfetchError`] - enumerated error kinds for every failure case
//! - [`ErrorContext`] - wrapper that adds suggestions for terminal display
//!
//! # Recovery policy
//!
//! A few kinds are recovered locally rather than propagated:
//! - [`ToolfetchError::ConnectionFailed`] and [`ToolfetchError::ServerRejected`]
//!   during the freshness probe become a skip decision when the destination
//!   already holds a previous install (see [`crate::gate`]).
//! - [`ToolfetchError::EntryEncrypted`] is always recovered by skipping the
//!   entry and logging a notice (see [`crate::extract`]).
//!
//! Everything else aborts the install attempt and propagates, wrapped in
//! [`ToolfetchError::InstallFailed`] so operators see the source URL and the
//! destination path without internal tracing.

use colored::Colorize;
use thiserror::Error;

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, ToolfetchError>;

/// The main error type for toolfetch operations.
///
/// Each variant represents a specific failure mode of the conditional
/// fetch-and-install pipeline. Variants carry the details an operator needs
/// to diagnose the failure (URLs, paths, byte counts) so no internal tracing
/// is required.
#[derive(Error, Debug)]
pub enum ToolfetchError {
    /// The source URL could not be parsed.
    #[error("Malformed URL '{url}': {reason}")]
    MalformedSource {
        /// The URL string that failed to parse
        url: String,
        /// Parser error detail
        reason: String,
    },

    /// A network-level failure: DNS, refused connection, reset, TLS.
    ///
    /// Distinguished from [`ServerRejected`](Self::ServerRejected), which
    /// means the server answered but with a non-success status.
    #[error("Could not connect to {url}: {reason}")]
    ConnectionFailed {
        /// The URL that could not be reached
        url: String,
        /// Transport-level error detail
        reason: String,
    },

    /// The server answered with a non-success status other than 304.
    #[error("Server rejected request for {url}: {status} {message}")]
    ServerRejected {
        /// The URL that was rejected
        url: String,
        /// HTTP status code
        status: u16,
        /// Status reason phrase, if known
        message: String,
    },

    /// The redirect chain exceeded the configured bound.
    #[error("Too many redirects fetching {url} (limit: {limit})")]
    TooManyRedirects {
        /// The URL whose redirect chain was too long
        url: String,
        /// The configured redirect bound
        limit: usize,
    },

    /// The whole archive is encrypted at the container level.
    ///
    /// Extraction aborts before writing anything; this is never a partial
    /// extraction.
    #[error("Archive is encrypted and cannot be extracted without credentials")]
    ArchiveEncrypted,

    /// A single entry is encrypted.
    ///
    /// Non-fatal: the extractor skips the entry and logs a notice. Reserved
    /// for codecs that cannot flag encryption up front: the built-in zip
    /// codec detects it from the central directory and reports it through
    /// [`ArchiveEntry::is_encrypted`](crate::archive::ArchiveEntry) instead,
    /// so it never raises this variant.
    #[error("Entry '{path}' is encrypted")]
    EntryEncrypted {
        /// Archive-relative path of the encrypted entry
        path: String,
    },

    /// An entry path would escape the destination directory.
    ///
    /// Fatal: aborts extraction. Nothing is ever written outside the
    /// destination.
    #[error("Entry '{path}' escapes the destination directory")]
    PathTraversal {
        /// The offending archive-relative path
        path: String,
    },

    /// The archive bytes could not be decoded (corrupt data, unsupported
    /// compression variant).
    #[error("Unreadable archive: {reason}")]
    UnreadableArchive {
        /// Codec error detail
        reason: String,
    },

    /// The download stream ended before the full body arrived.
    ///
    /// Carries bytes-read-so-far against the expected length (when the
    /// server advertised one) to make partial downloads diagnosable.
    #[error("Download ended early: {bytes_read} bytes read, expected {expected:?}")]
    PartialRead {
        /// Bytes successfully read before the stream failed
        bytes_read: u64,
        /// `Content-Length` advertised by the server, if any
        expected: Option<u64>,
    },

    /// Wrapper adding source/destination context to any install failure.
    #[error("Failed to install {url} to {dest}")]
    InstallFailed {
        /// The archive source URL
        url: String,
        /// The destination directory
        dest: String,
        /// The underlying failure
        #[source]
        source: Box<ToolfetchError>,
    },

    /// Standard I/O error from [`std::io::Error`].
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToolfetchError {
    /// Strip the [`InstallFailed`](Self::InstallFailed) wrapper, if present,
    /// to reach the underlying failure kind.
    #[must_use]
    pub fn root_kind(&self) -> &ToolfetchError {
        match self {
            Self::InstallFailed { source, .. } => source.root_kind(),
            other => other,
        }
    }
}

/// Error wrapper providing user-friendly display with suggestions.
///
/// Wraps any error with an optional suggestion line, displayed in color on
/// the terminal. Built by [`user_friendly_error`].
pub struct ErrorContext {
    /// The underlying error
    pub error: anyhow::Error,
    /// Actionable advice shown below the error, if any
    pub suggestion: Option<String>,
}

impl ErrorContext {
    /// Wrap an error without a suggestion.
    pub fn new(error: impl Into<anyhow::Error>) -> Self {
        Self { error: error.into(), suggestion: None }
    }

    /// Attach an actionable suggestion line.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Print the error chain and suggestion to stderr with colors.
    pub fn display(&self) {
        eprintln!("{} {}", "Error:".red().bold(), self.error);
        for cause in self.error.chain().skip(1) {
            eprintln!("  {} {}", "Caused by:".yellow(), cause);
        }
        if let Some(suggestion) = &self.suggestion {
            eprintln!("\n{} {}", "Suggestion:".green().bold(), suggestion);
        }
    }
}

impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }
        Ok(())
    }
}

/// Convert any error into a user-friendly [`ErrorContext`] with a suggestion
/// matched to the failure kind.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let suggestion = error
        .downcast_ref::<ToolfetchError>()
        .and_then(|e| suggestion_for(e.root_kind()));
    match suggestion {
        Some(s) => ErrorContext::new(error).with_suggestion(s),
        None => ErrorContext::new(error),
    }
}

fn suggestion_for(error: &ToolfetchError) -> Option<String> {
    let suggestion = match error {
        ToolfetchError::MalformedSource { .. } => {
            "Check the URL for typos; it must be an absolute http(s) URL"
        }
        ToolfetchError::ConnectionFailed { .. } => {
            "Check network connectivity, the host name, and any proxy settings"
        }
        ToolfetchError::ServerRejected { .. } => {
            "The server answered but refused the request; verify the URL points at a downloadable archive"
        }
        ToolfetchError::TooManyRedirects { .. } => {
            "The server redirect chain may be looping; try the final URL directly or raise --max-redirects"
        }
        ToolfetchError::ArchiveEncrypted => {
            "toolfetch does not manage archive credentials; publish an unencrypted archive"
        }
        ToolfetchError::PathTraversal { .. } => {
            "The archive contains unsafe entry paths and should not be trusted"
        }
        ToolfetchError::UnreadableArchive { .. } => {
            "The download may be corrupt or not an archive in the expected format; retry or check the URL"
        }
        ToolfetchError::PartialRead { .. } => {
            "The download was cut short; retry, the next run re-fetches from scratch"
        }
        _ => return None,
    };
    Some(suggestion.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_kind_unwraps_install_failed() {
        let err = ToolfetchError::InstallFailed {
            url: "http://example.com/t.zip".to_string(),
            dest: "/tmp/t".to_string(),
            source: Box::new(ToolfetchError::PathTraversal { path: "../evil".to_string() }),
        };
        assert!(matches!(err.root_kind(), ToolfetchError::PathTraversal { .. }));
    }

    #[test]
    fn suggestions_cover_fatal_kinds() {
        let err = ToolfetchError::TooManyRedirects {
            url: "http://example.com".to_string(),
            limit: 20,
        };
        let ctx = user_friendly_error(anyhow::Error::from(err));
        assert!(ctx.suggestion.is_some());
    }

    #[test]
    fn encrypted_entry_names_the_path() {
        let err = ToolfetchError::EntryEncrypted { path: "secret/key.pem".to_string() };
        assert!(err.to_string().contains("secret/key.pem"));
        // Always recovered locally by skipping, so no suggestion is offered.
        assert!(suggestion_for(&err).is_none());
    }

    #[test]
    fn display_includes_source_and_destination() {
        let err = ToolfetchError::InstallFailed {
            url: "http://example.com/t.zip".to_string(),
            dest: "/opt/tool".to_string(),
            source: Box::new(ToolfetchError::ArchiveEncrypted),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("http://example.com/t.zip"));
        assert!(rendered.contains("/opt/tool"));
    }
}
