//! toolfetch - provision tools from remote archives.
//!
//! Given a URL pointing to a compressed archive, toolfetch ensures a local
//! directory contains the unpacked contents of that archive, re-downloading
//! only when the remote resource has changed.
//!
//! # Architecture
//!
//! The pipeline is a chain of small components:
//!
//! - [`gate`] - decides whether a download is necessary at all, combining a
//!   persisted timestamp marker with a conditional-GET probe
//! - [`fetch`] - redirect-following, proxy-aware HTTP retrieval with
//!   diagnosable partial-download failures
//! - [`archive`] - the archive-reading capability behind a narrow trait,
//!   with a zip codec wired in
//! - [`extract`] - materializes entries into the destination with mandatory
//!   path-safety checks
//! - [`installer`] - orchestrates the above and owns the atomic-marker
//!   protocol: the timestamp marker moves only after a fully successful
//!   extraction
//!
//! # Correctness invariants
//!
//! - The destination directory is never partially stale: it is fully cleared
//!   before re-extraction, so files removed from a newer archive do not
//!   linger.
//! - The timestamp marker is written only after extraction succeeds. Any
//!   failure in between leaves the marker at its old value, forcing a retry
//!   on the next run.
//! - No entry is ever written outside the destination directory; traversal
//!   attempts abort the install.
//!
//! # Example
//!
//! ```rust,no_run
//! use toolfetch::core::TracingSink;
//! use toolfetch::fetch::{ArchiveSource, NetworkContext};
//! use toolfetch::gate::InstallTarget;
//! use toolfetch::installer::Installer;
//!
//! # async fn example() -> toolfetch::core::Result<()> {
//! let source = ArchiveSource::parse(
//!     "https://example.com/releases/tool-1.2.zip",
//!     NetworkContext::default(),
//! )?;
//! let target = InstallTarget::new("/opt/tools/tool");
//!
//! let mut sink = TracingSink;
//! let outcome = Installer::new().install(&target, &source, &mut sink).await?;
//! println!("installed: {}", outcome.installed());
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod cli;
pub mod core;
pub mod extract;
pub mod fetch;
pub mod gate;
pub mod installer;
pub mod utils;
pub mod validate;
