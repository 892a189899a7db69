//! Zip-backed implementation of the archive reading capability.
//!
//! Wraps [`zip::ZipArchive`] behind the [`ArchiveReader`] trait. Entry
//! metadata is read from the central directory first (`by_index_raw`) so
//! encrypted entries can be reported as such instead of failing the whole
//! install; content streams are only opened for entries that can actually be
//! decoded.

use std::fs::File;
use std::io::{Read, Seek};

use zip::ZipArchive;
use zip::result::ZipError;

use super::{ArchiveCodec, ArchiveEntry, ArchiveReader};
use crate::core::{Result, ToolfetchError};

/// Codec opening [`ZipReader`]s over spooled downloads.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipCodec;

impl ZipCodec {
    /// Create the codec.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ArchiveCodec for ZipCodec {
    type Reader = ZipReader<File>;

    fn open(&self, spool: File) -> Result<Self::Reader> {
        ZipReader::open(spool)
    }
}

/// Lazy entry reader over a zip archive.
pub struct ZipReader<R: Read + Seek> {
    archive: ZipArchive<R>,
    index: usize,
}

impl<R: Read + Seek> ZipReader<R> {
    /// Parse the zip central directory from `reader`.
    ///
    /// Fails with [`ToolfetchError::UnreadableArchive`] when the bytes are
    /// not a valid zip archive.
    pub fn open(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader).map_err(unreadable)?;
        Ok(Self { archive, index: 0 })
    }
}

impl<R: Read + Seek> ArchiveReader for ZipReader<R> {
    fn container_encrypted(&self) -> bool {
        // Zip has no container-level encryption flag; encryption is per entry.
        false
    }

    fn next_entry(&mut self) -> Result<Option<ArchiveEntry<'_>>> {
        if self.index >= self.archive.len() {
            return Ok(None);
        }
        let index = self.index;
        self.index += 1;

        // Metadata comes from the raw (undecoded) view so an encrypted entry
        // can still be described.
        let (relative_path, is_dir, size_hint) = {
            let raw = self.archive.by_index_raw(index).map_err(unreadable)?;
            (raw.name().to_string(), raw.is_dir(), Some(raw.size()))
        };

        if is_dir {
            return Ok(Some(ArchiveEntry {
                relative_path,
                is_dir: true,
                is_encrypted: false,
                size_hint,
                reader: None,
            }));
        }

        match self.archive.by_index(index) {
            Ok(file) => Ok(Some(ArchiveEntry {
                relative_path,
                is_dir: false,
                is_encrypted: false,
                size_hint,
                reader: Some(Box::new(file)),
            })),
            Err(ZipError::UnsupportedArchive(msg)) if msg.contains("Password") => {
                Ok(Some(ArchiveEntry {
                    relative_path,
                    is_dir: false,
                    is_encrypted: true,
                    size_hint,
                    reader: None,
                }))
            }
            Err(ZipError::InvalidPassword) => Ok(Some(ArchiveEntry {
                relative_path,
                is_dir: false,
                is_encrypted: true,
                size_hint,
                reader: None,
            })),
            Err(other) => Err(unreadable(other)),
        }
    }
}

fn unreadable(err: ZipError) -> ToolfetchError {
    ToolfetchError::UnreadableArchive { reason: err.to_string() }
}
