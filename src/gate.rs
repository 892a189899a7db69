//! Freshness gate: decides whether a download is necessary at all.
//!
//! The decision combines a locally persisted [`TimestampMarker`] with the
//! remote's metadata from a conditional probe:
//!
//! - marker absent → [`Decision::Proceed`] (never installed)
//! - marker present but the install directory missing → the marker is ignored
//!   and the probe is unconditional: the contents it described are gone, and
//!   honoring it would skip forever without ever repairing the install
//! - probe connect failure with a previous install present →
//!   [`Decision::SkipUnreachable`] (do not break a working tool because the
//!   source is temporarily down); without a previous install the failure is
//!   fatal, there is nothing to fall back to
//! - HTTP 304 → [`Decision::SkipUnchanged`]
//! - other non-success status → [`Decision::SkipUnreachable`] when content
//!   exists, fatal otherwise
//! - `Last-Modified` exactly equal to the marker → [`Decision::SkipUnchanged`]
//!   (defends against servers that answer 200 without honoring the
//!   conditional header)
//! - otherwise → [`Decision::Proceed`]
//!
//! The marker holds the raw `Last-Modified` HTTP-date string and lives as a
//! hidden sibling file next to the install directory, so clearing the
//! directory during reinstall cannot destroy it. It is only ever written
//! after a fully successful extraction.

use std::fs;
use std::path::{Path, PathBuf};

use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::core::{Result, ToolfetchError};
use crate::fetch::{ArchiveSource, Fetcher};
use crate::utils::fs::{clear_dir, ensure_dir};

/// The directory designated as the install destination.
///
/// Either does not exist yet, or exists and is fully owned by the installer:
/// its contents are wholly replaced on every reinstall.
#[derive(Debug, Clone)]
pub struct InstallTarget {
    dir: PathBuf,
}

impl InstallTarget {
    /// Designate `dir` as an install destination.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The destination directory path.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether the destination directory currently exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.dir.is_dir()
    }

    /// The timestamp marker paired with this target: a hidden file named
    /// `.<dirname>.timestamp` next to the directory.
    #[must_use]
    pub fn marker(&self) -> TimestampMarker {
        let name = self
            .dir
            .file_name()
            .map_or_else(|| "install".to_string(), |n| n.to_string_lossy().into_owned());
        TimestampMarker { path: self.dir.with_file_name(format!(".{name}.timestamp")) }
    }

    /// Make the destination ready for extraction: clear it if it exists,
    /// create it otherwise.
    pub fn prepare(&self) -> Result<()> {
        if self.exists() {
            debug!(dir = %self.dir.display(), "clearing previous install contents");
            clear_dir(&self.dir)
        } else {
            ensure_dir(&self.dir)
        }
    }
}

/// Persisted `Last-Modified` value of the archive that produced the current
/// installed contents. Absence means "never installed" and forces an
/// unconditional fetch.
#[derive(Debug, Clone)]
pub struct TimestampMarker {
    path: PathBuf,
}

impl TimestampMarker {
    /// Location of the marker file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored value. `None` when the marker is absent or empty.
    #[must_use]
    pub fn read(&self) -> Option<String> {
        let value = fs::read_to_string(&self.path).ok()?;
        let trimmed = value.trim();
        if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
    }

    /// Persist a new value. Called only after a fully successful extraction.
    pub fn write(&self, value: &str) -> Result<()> {
        fs::write(&self.path, value)?;
        Ok(())
    }

    /// Remove the marker, forcing an unconditional fetch on the next run.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Outcome of the freshness gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The remote resource has not changed; nothing to do.
    SkipUnchanged,
    /// The remote is unreachable or rejecting requests, but a previous
    /// install exists and keeps working.
    SkipUnreachable {
        /// Human-readable reason for the skip, for the log sink.
        reason: String,
    },
    /// A (re-)download is necessary.
    Proceed,
}

/// Decide whether installing from `source` into `target` is necessary.
///
/// Sends a probe request through `fetcher` with an `If-Modified-Since`
/// condition when a marker is present. See the module docs for the full
/// decision table.
///
/// # Errors
///
/// Propagates [`ToolfetchError::ConnectionFailed`] and
/// [`ToolfetchError::ServerRejected`] only when no previous install exists;
/// all other probe failures (for example [`ToolfetchError::TooManyRedirects`])
/// always propagate.
pub async fn should_install(
    target: &InstallTarget,
    source: &ArchiveSource,
    fetcher: &Fetcher,
) -> Result<Decision> {
    // A marker that outlives the directory describes contents that are gone;
    // ignore it so the probe is unconditional and the install is repaired.
    let stored = if target.exists() { target.marker().read() } else { None };
    debug!(url = %source.url, marker = ?stored, "probing source for freshness");

    let metadata = match fetcher.probe(&source.url, stored.as_deref()).await {
        Ok(metadata) => metadata,
        Err(ToolfetchError::ConnectionFailed { url, reason }) => {
            if target.exists() {
                warn!(url = %url, %reason, "source unreachable, keeping existing install");
                return Ok(Decision::SkipUnreachable { reason });
            }
            return Err(ToolfetchError::ConnectionFailed { url, reason });
        }
        Err(other) => return Err(other),
    };

    if metadata.status == StatusCode::NOT_MODIFIED {
        // A 304 answer to an unconditional probe is a server defect; there is
        // nothing installed to keep, so fall through to a real download.
        return if stored.is_some() {
            Ok(Decision::SkipUnchanged)
        } else {
            Ok(Decision::Proceed)
        };
    }

    if !metadata.status.is_success() {
        let reason = format!(
            "server error: {} {}",
            metadata.status.as_u16(),
            metadata.status.canonical_reason().unwrap_or("")
        );
        if target.exists() {
            warn!(url = %source.url, %reason, "source rejecting requests, keeping existing install");
            return Ok(Decision::SkipUnreachable { reason });
        }
        return Err(ToolfetchError::ServerRejected {
            url: source.url.to_string(),
            status: metadata.status.as_u16(),
            message: metadata.status.canonical_reason().unwrap_or("").to_string(),
        });
    }

    // Some servers return 200 without honoring the conditional header;
    // an exactly equal Last-Modified still means unchanged.
    if let (Some(stored), Some(remote)) = (&stored, &metadata.last_modified) {
        if stored == remote {
            return Ok(Decision::SkipUnchanged);
        }
    }

    Ok(Decision::Proceed)
}
