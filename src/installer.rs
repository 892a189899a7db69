//! Install coordination: probe, download, extract, finalize.
//!
//! [`Installer::install`] runs one install operation end to end:
//!
//! ```text
//! Idle -> Probing -> (SkipUnchanged | SkipUnreachable)   terminal, no-op
//!                 -> Proceed -> Downloading -> Extracting -> Finalizing
//!                                                        -> Failed
//! ```
//!
//! The core correctness invariant is the marker ordering: the timestamp
//! marker is written only after the extractor returns successfully, from the
//! `Last-Modified` captured on the download response. A crash or extraction
//! failure between clearing the directory and writing the marker leaves the
//! marker at its old value, forcing a retry on the next run instead of
//! falsely recording success. A failed attempt may leave the destination
//! empty or partially written; the next run's Proceed path repairs it by
//! re-clearing and re-extracting. There is no silent resume of partial
//! installs, and no rollback.
//!
//! Cancelling the future before Finalizing likewise leaves the marker
//! untouched. Only one network fetch is in flight per operation; extraction
//! starts only once the downloaded stream has been fully spooled and opened
//! by the codec. Concurrent installs into the same destination from multiple
//! callers are not coordinated and are outside the correctness guarantees.

use std::io::{Seek, SeekFrom};

use tracing::debug;

use crate::archive::{ArchiveCodec, ZipCodec};
use crate::core::{LogSink, Result, ToolfetchError};
use crate::extract::extract;
use crate::fetch::{ArchiveSource, Fetcher};
use crate::gate::{Decision, InstallTarget, should_install};

/// Result of one install operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The archive was downloaded and extracted.
    Installed {
        /// Count of regular files the extractor wrote.
        files_written: u64,
    },
    /// The remote resource has not changed; nothing was touched.
    SkippedUnchanged,
    /// The source was unreachable but a previous install exists; nothing was
    /// touched.
    SkippedUnreachable,
}

impl InstallOutcome {
    /// Whether this operation actually installed new content.
    #[must_use]
    pub fn installed(&self) -> bool {
        matches!(self, Self::Installed { .. })
    }
}

/// Orchestrates the freshness gate, the fetcher, and the extractor.
///
/// Generic over the [`ArchiveCodec`] so other archive formats (or failure
/// injection in tests) can be wired in; defaults to [`ZipCodec`].
pub struct Installer<C = ZipCodec> {
    codec: C,
}

impl Installer<ZipCodec> {
    /// Installer using the zip codec.
    #[must_use]
    pub fn new() -> Self {
        Self { codec: ZipCodec::new() }
    }
}

impl Default for Installer<ZipCodec> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ArchiveCodec> Installer<C> {
    /// Installer using a custom archive codec.
    pub fn with_codec(codec: C) -> Self {
        Self { codec }
    }

    /// Ensure `target` contains the unpacked contents of the archive at
    /// `source`, re-downloading only when the remote has changed.
    ///
    /// Reports one line per major transition to `sink`, including the final
    /// failure line. Returns a skip outcome without touching the destination
    /// when the gate decides no download is necessary.
    ///
    /// # Errors
    ///
    /// Every failure is wrapped in [`ToolfetchError::InstallFailed`] carrying
    /// the source URL and destination path, with the underlying kind
    /// preserved as the source. Use
    /// [`root_kind`](ToolfetchError::root_kind) to react to the specific
    /// failure mode.
    pub async fn install(
        &self,
        target: &InstallTarget,
        source: &ArchiveSource,
        sink: &mut dyn LogSink,
    ) -> Result<InstallOutcome> {
        match self.try_install(target, source, sink).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                let wrapped = match e {
                    wrapped @ ToolfetchError::InstallFailed { .. } => wrapped,
                    other => ToolfetchError::InstallFailed {
                        url: source.url.to_string(),
                        dest: target.dir().display().to_string(),
                        source: Box::new(other),
                    },
                };
                sink.line(&wrapped.to_string());
                Err(wrapped)
            }
        }
    }

    async fn try_install(
        &self,
        target: &InstallTarget,
        source: &ArchiveSource,
        sink: &mut dyn LogSink,
    ) -> Result<InstallOutcome> {
        let fetcher = Fetcher::new(&source.network)?;

        match should_install(target, source, &fetcher).await? {
            Decision::SkipUnchanged => {
                sink.line(&format!("Skipping installation of {}: remote unchanged", source.url));
                return Ok(InstallOutcome::SkippedUnchanged);
            }
            Decision::SkipUnreachable { reason } => {
                sink.line(&format!("Skipping installation of {}: {reason}", source.url));
                return Ok(InstallOutcome::SkippedUnreachable);
            }
            Decision::Proceed => {}
        }

        sink.line(&format!("Unpacking {} to {}", source.url, target.dir().display()));

        let mut spool = tempfile::tempfile()?;
        let (metadata, bytes) = fetcher.download(&source.url, &mut spool).await?;
        debug!(bytes, url = %source.url, "archive spooled");

        spool.seek(SeekFrom::Start(0))?;
        // Open the codec before touching the destination, so an unreadable
        // download leaves the previous install intact.
        let mut reader = self.codec.open(spool)?;

        target.prepare()?;
        let files_written = extract(&mut reader, target.dir(), sink)?;
        if files_written == 0 {
            sink.line(&format!("Warning: archive at {} produced no files", source.url));
        }

        // Finalizing: the marker moves only after a fully successful
        // extraction. An unknown Last-Modified clears it, forcing an
        // unconditional fetch next run.
        let marker = target.marker();
        match &metadata.last_modified {
            Some(value) => marker.write(value)?,
            None => marker.clear()?,
        }

        sink.line(&format!("Installed {files_written} file(s) from {}", source.url));
        Ok(InstallOutcome::Installed { files_written })
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::io::{Cursor, Write};
    use std::path::Path;

    use zip::write::SimpleFileOptions;

    use super::*;
    use crate::archive::{ArchiveEntry, ArchiveReader};
    use crate::core::MemorySink;
    use crate::fetch::NetworkContext;

    fn build_zip(entries: &[(&str, Option<&[u8]>)]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            let options = SimpleFileOptions::default();
            for (name, data) in entries {
                match data {
                    None => writer.add_directory(name.to_string(), options).unwrap(),
                    Some(bytes) => {
                        writer.start_file(name.to_string(), options).unwrap();
                        writer.write_all(bytes).unwrap();
                    }
                }
            }
            writer.finish().unwrap();
        }
        cursor.into_inner()
    }

    fn target_in(dir: &Path) -> InstallTarget {
        InstallTarget::new(dir.join("tool"))
    }

    fn source_for(server: &mockito::Server) -> ArchiveSource {
        ArchiveSource::parse(&format!("{}/tool.zip", server.url()), NetworkContext::default())
            .unwrap()
    }

    /// Codec whose reader fails on the first entry, simulating an extraction
    /// failure after the directory has been cleared.
    struct FailingCodec;

    struct FailingReader;

    impl ArchiveReader for FailingReader {
        fn container_encrypted(&self) -> bool {
            false
        }

        fn next_entry(&mut self) -> Result<Option<ArchiveEntry<'_>>> {
            Err(ToolfetchError::UnreadableArchive { reason: "injected failure".to_string() })
        }
    }

    impl ArchiveCodec for FailingCodec {
        type Reader = FailingReader;

        fn open(&self, _spool: File) -> Result<Self::Reader> {
            Ok(FailingReader)
        }
    }

    #[tokio::test]
    async fn failed_extraction_leaves_marker_at_previous_value() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/tool.zip")
            .with_status(200)
            .with_header("last-modified", "Thu, 02 Jan 2025 00:00:00 GMT")
            .with_body(build_zip(&[("file.txt", Some(b"new"))]))
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let target = target_in(dir.path());
        std::fs::create_dir_all(target.dir()).unwrap();
        std::fs::write(target.dir().join("old.txt"), b"previous install").unwrap();
        target.marker().write("Wed, 01 Jan 2025 00:00:00 GMT").unwrap();

        let installer = Installer::with_codec(FailingCodec);
        let mut sink = MemorySink::new();
        let err = installer.install(&target, &source_for(&server), &mut sink).await.unwrap_err();

        assert!(matches!(err.root_kind(), ToolfetchError::UnreadableArchive { .. }));
        // The marker keeps its pre-attempt value so the next run retries.
        assert_eq!(target.marker().read().as_deref(), Some("Wed, 01 Jan 2025 00:00:00 GMT"));
        // Degraded state is accepted: the directory was cleared.
        assert!(target.dir().is_dir());
    }

    #[tokio::test]
    async fn failed_first_attempt_leaves_marker_absent() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/tool.zip")
            .with_status(200)
            .with_header("last-modified", "Thu, 02 Jan 2025 00:00:00 GMT")
            .with_body(build_zip(&[("file.txt", Some(b"new"))]))
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let target = target_in(dir.path());

        let installer = Installer::with_codec(FailingCodec);
        let mut sink = MemorySink::new();
        installer.install(&target, &source_for(&server), &mut sink).await.unwrap_err();

        assert_eq!(target.marker().read(), None);
    }

    #[tokio::test]
    async fn unreadable_download_leaves_previous_install_intact() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/tool.zip")
            .with_status(200)
            .with_header("last-modified", "Thu, 02 Jan 2025 00:00:00 GMT")
            .with_body("definitely not a zip archive")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let target = target_in(dir.path());
        std::fs::create_dir_all(target.dir()).unwrap();
        std::fs::write(target.dir().join("keep.txt"), b"previous install").unwrap();
        target.marker().write("Wed, 01 Jan 2025 00:00:00 GMT").unwrap();

        let installer = Installer::new();
        let mut sink = MemorySink::new();
        let err = installer.install(&target, &source_for(&server), &mut sink).await.unwrap_err();

        assert!(matches!(err.root_kind(), ToolfetchError::UnreadableArchive { .. }));
        // Codec opening happens before the clear, so the old install survives.
        assert!(target.dir().join("keep.txt").exists());
        assert_eq!(target.marker().read().as_deref(), Some("Wed, 01 Jan 2025 00:00:00 GMT"));
    }

    #[tokio::test]
    async fn install_without_last_modified_clears_marker() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/tool.zip")
            .with_status(200)
            .with_body(build_zip(&[("file.txt", Some(b"contents"))]))
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let target = target_in(dir.path());
        target.marker().write("Wed, 01 Jan 2025 00:00:00 GMT").unwrap();

        let installer = Installer::new();
        let mut sink = MemorySink::new();
        let outcome = installer.install(&target, &source_for(&server), &mut sink).await.unwrap();

        assert!(outcome.installed());
        assert_eq!(target.marker().read(), None);
    }

    #[tokio::test]
    async fn empty_archive_warns_but_succeeds() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/tool.zip")
            .with_status(200)
            .with_header("last-modified", "Thu, 02 Jan 2025 00:00:00 GMT")
            .with_body(build_zip(&[]))
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let target = target_in(dir.path());

        let installer = Installer::new();
        let mut sink = MemorySink::new();
        let outcome = installer.install(&target, &source_for(&server), &mut sink).await.unwrap();

        assert_eq!(outcome, InstallOutcome::Installed { files_written: 0 });
        assert!(sink.lines.iter().any(|l| l.contains("produced no files")));
    }
}
