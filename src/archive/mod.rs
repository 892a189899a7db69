//! Archive reading capability.
//!
//! The install engine treats archive decoding as an external capability
//! behind a narrow interface: an [`ArchiveReader`] yields a lazy, in-order
//! sequence of [`ArchiveEntry`] values, and an [`ArchiveCodec`] knows how to
//! open a reader over a downloaded spool file. The engine fully drains the
//! sequence or aborts on the first unrecoverable codec error, surfaced as
//! [`ToolfetchError::UnreadableArchive`].
//!
//! One concrete codec is wired in: [`zip::ZipCodec`]. The core never depends
//! on zip specifics, so other compressed-archive formats can be plugged in by
//! implementing these two traits.

pub mod zip;

use std::fs::File;
use std::io::Read;

use crate::core::Result;

pub use zip::{ZipCodec, ZipReader};

/// One entry of an archive, consumed once during extraction.
pub struct ArchiveEntry<'a> {
    /// Path of the entry relative to the archive root, as recorded in the
    /// archive. Not yet validated; see [`crate::utils::fs::safe_join`].
    pub relative_path: String,
    /// Whether the entry is a directory.
    pub is_dir: bool,
    /// Whether the entry content is encrypted. Encrypted entries carry no
    /// content stream and are skipped by the extractor.
    pub is_encrypted: bool,
    /// Uncompressed size, when the archive records one.
    pub size_hint: Option<u64>,
    /// Content stream for regular files; `None` for directories and
    /// encrypted entries.
    pub reader: Option<Box<dyn Read + 'a>>,
}

/// Lazy, in-order producer of archive entries.
///
/// Lending-iterator style: each returned [`ArchiveEntry`] borrows the reader
/// and must be dropped before the next call. Entries are produced in archive
/// order; the extractor never reorders or deduplicates them.
pub trait ArchiveReader {
    /// Whether the archive is encrypted at the container level.
    ///
    /// When true, extraction aborts before writing anything.
    fn container_encrypted(&self) -> bool;

    /// Produce the next entry, or `None` when the archive is exhausted.
    fn next_entry(&mut self) -> Result<Option<ArchiveEntry<'_>>>;
}

/// Factory opening an [`ArchiveReader`] over a downloaded archive.
///
/// The spool file's cursor is positioned at the start of the archive bytes.
pub trait ArchiveCodec {
    /// The reader type this codec produces.
    type Reader: ArchiveReader;

    /// Open a reader over the spooled archive bytes.
    ///
    /// Fails with [`ToolfetchError::UnreadableArchive`] when the bytes are
    /// not a valid archive in this codec's format.
    fn open(&self, spool: File) -> Result<Self::Reader>;
}
