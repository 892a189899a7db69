//! Materializes an archive entry sequence into a destination directory.
//!
//! Entries are processed strictly in the order the [`ArchiveReader`] produces
//! them, with no reordering and no deduplication: for duplicate paths the
//! last write wins. Path safety is mandatory regardless of archive format -
//! any entry path that would resolve outside the destination aborts the whole
//! extraction with [`ToolfetchError::PathTraversal`].
//!
//! Encrypted entries cannot be extracted without credentials, which this
//! system does not manage; they are skipped with a notice on the log sink. An
//! archive encrypted at the container level aborts before anything is
//! written.

use std::fs::File;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::archive::ArchiveReader;
use crate::core::{LogSink, Result, ToolfetchError};
use crate::utils::fs::{ensure_dir, safe_join};

/// Drain `reader` into `destination`, returning the count of regular files
/// written.
///
/// Callers treat a zero count as a soft warning ("archive produced no usable
/// files"), not an error.
///
/// # Errors
///
/// - [`ToolfetchError::ArchiveEncrypted`] when the container itself is
///   encrypted; nothing is written
/// - [`ToolfetchError::PathTraversal`] for entry paths escaping the
///   destination; extraction aborts immediately
/// - [`ToolfetchError::UnreadableArchive`] when entry content cannot be
///   decoded
pub fn extract<R: ArchiveReader + ?Sized>(
    reader: &mut R,
    destination: &Path,
    sink: &mut dyn LogSink,
) -> Result<u64> {
    if reader.container_encrypted() {
        return Err(ToolfetchError::ArchiveEncrypted);
    }

    let mut files_written: u64 = 0;

    while let Some(entry) = reader.next_entry()? {
        if entry.is_encrypted {
            sink.line(&format!("Skipping encrypted entry: {}", entry.relative_path));
            continue;
        }

        if entry.is_dir {
            ensure_dir(&safe_join(destination, &entry.relative_path)?)?;
            continue;
        }

        let path = safe_join(destination, &entry.relative_path)?;
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }

        let mut content = entry.reader.ok_or_else(|| ToolfetchError::UnreadableArchive {
            reason: format!("entry '{}' has no content stream", entry.relative_path),
        })?;
        // Truncates any previous file at this path: last write wins.
        let mut out = File::create(&path)?;
        io::copy(&mut content, &mut out).map_err(|e| match e.kind() {
            io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => {
                ToolfetchError::UnreadableArchive { reason: e.to_string() }
            }
            _ => ToolfetchError::Io(e),
        })?;

        debug!(path = %path.display(), "extracted file");
        files_written += 1;
    }

    Ok(files_written)
}
