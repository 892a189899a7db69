//! File system helpers for safe install-directory handling.
//!
//! Three operations the pipeline relies on:
//!
//! - [`ensure_dir`] - create a directory tree, tolerating existing directories
//! - [`clear_dir`] - empty a directory without removing it, so a reinstall
//!   never leaves stale files from a previous version
//! - [`safe_join`] - resolve an archive-relative path against a destination,
//!   rejecting anything that would escape it
//!
//! Path traversal is treated as an attack, not a recoverable condition:
//! [`safe_join`] fails with [`ToolfetchError::PathTraversal`] rather than
//! sanitizing the path, so a hostile archive aborts the install instead of
//! silently writing somewhere unexpected.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::core::{Result, ToolfetchError};

/// Ensure a directory exists, creating it and all parents if necessary.
///
/// Never fails if the directory already exists. Fails if the path exists but
/// is not a directory.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    } else if !path.is_dir() {
        return Err(ToolfetchError::Io(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("path exists but is not a directory: {}", path.display()),
        )));
    }
    Ok(())
}

/// Remove every entry inside `path` without removing `path` itself.
///
/// Used before re-extraction so files removed from a newer archive cannot
/// linger from the previous install.
pub fn clear_dir(path: &Path) -> Result<()> {
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let entry_path = entry.path();
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&entry_path)?;
        } else {
            fs::remove_file(&entry_path)?;
        }
    }
    Ok(())
}

/// Resolve an archive-relative entry path against a destination directory.
///
/// Rejects with [`ToolfetchError::PathTraversal`]:
/// - absolute paths (`/etc/passwd`, `C:\evil`)
/// - any `..` segment that would climb above the destination
///
/// `.` segments are ignored; `..` segments that stay within already-pushed
/// entry components are resolved.
pub fn safe_join(destination: &Path, relative: &str) -> Result<PathBuf> {
    let mut resolved = destination.to_path_buf();
    let mut depth = 0usize;

    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => {
                resolved.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return Err(ToolfetchError::PathTraversal { path: relative.to_string() });
                }
                resolved.pop();
                depth -= 1;
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(ToolfetchError::PathTraversal { path: relative.to_string() });
            }
        }
    }

    Ok(resolved)
}
