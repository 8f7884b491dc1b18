//! Mutations applied to the replica tree.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use tempfile::NamedTempFile;
use treemirror_core::{EntryKind, MirrorError};

/// Copy a file's bytes and metadata over `destination`.
///
/// The content is staged in a temporary file next to the destination and
/// renamed into place, so the replica never holds a half-written file and
/// read-only replica files can still be refreshed. Returns the number of
/// bytes written.
pub fn copy_file(
    source: &Path,
    destination: &Path,
    preserve_timestamps: bool,
) -> Result<u64, MirrorError> {
    let parent = destination.parent().unwrap_or_else(|| Path::new("."));

    let mut reader = File::open(source).map_err(|e| MirrorError::io(source, e))?;
    let metadata = reader.metadata().map_err(|e| MirrorError::io(source, e))?;

    let mut staged = NamedTempFile::new_in(parent).map_err(|e| MirrorError::io(parent, e))?;
    let bytes = io::copy(&mut reader, staged.as_file_mut())
        .map_err(|e| MirrorError::io(destination, e))?;

    if preserve_timestamps {
        if let Ok(modified) = metadata.modified() {
            staged
                .as_file()
                .set_modified(modified)
                .map_err(|e| MirrorError::io(destination, e))?;
        }
    }
    staged
        .as_file()
        .set_permissions(metadata.permissions())
        .map_err(|e| MirrorError::io(destination, e))?;

    staged
        .persist(destination)
        .map_err(|e| MirrorError::io(destination, e.error))?;

    Ok(bytes)
}

/// Create a single empty directory. The parent must exist.
pub fn create_dir(path: &Path) -> Result<(), MirrorError> {
    fs::create_dir(path).map_err(|e| MirrorError::io(path, e))
}

/// Remove a replica entry of the given kind.
///
/// Directories are removed with all their contents; anything else,
/// including symlinks, is unlinked without following it.
pub fn remove_entry(path: &Path, kind: EntryKind) -> Result<(), MirrorError> {
    let result = match kind {
        EntryKind::Directory => fs::remove_dir_all(path),
        EntryKind::File | EntryKind::Other => fs::remove_file(path),
    };
    result.map_err(|e| MirrorError::io(path, e))
}

/// Size of a source file, for reporting dry-run copies.
pub fn file_size(path: &Path) -> Result<u64, MirrorError> {
    fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| MirrorError::io(path, e))
}
