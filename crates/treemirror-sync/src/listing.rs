//! Directory listing and classification.

use std::fs;
use std::io;
use std::path::Path;

use treemirror_core::{DirectorySnapshot, Entry, EntryKind, MirrorError};

/// Which side of the mirror a directory belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Source links to files mirror as files. Links to directories are
    /// never walked, so a link cannot lead back into the source or into the
    /// replica.
    Source,
    /// Replica entries never follow symlinks, so the walk cannot escape the
    /// replica tree.
    Replica,
}

/// List the immediate children of a directory.
pub fn list_entries(dir: &Path, side: Side) -> Result<Vec<Entry>, MirrorError> {
    let read_dir = fs::read_dir(dir).map_err(|e| MirrorError::io(dir, e))?;

    let mut entries = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| MirrorError::io(dir, e))?;
        let file_type = entry.file_type().map_err(|e| MirrorError::io(entry.path(), e))?;

        let kind = if side == Side::Source && file_type.is_symlink() {
            source_link_kind(&entry.path())?
        } else {
            EntryKind::from_file_type(file_type)
        };

        entries.push(Entry::new(entry.file_name(), kind));
    }

    Ok(entries)
}

/// Resolve a source symlink to the kind it is mirrored as.
fn source_link_kind(path: &Path) -> Result<EntryKind, MirrorError> {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => Ok(EntryKind::File),
        Ok(_) => Ok(EntryKind::Other),
        // Dangling
        Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::NotADirectory) => {
            Ok(EntryKind::Other)
        }
        Err(e) => Err(MirrorError::io(path, e)),
    }
}

/// Classify the children of `source` against `replica`.
///
/// When `replica_exists` is false the replica side is treated as empty
/// without touching the filesystem.
pub fn snapshot(
    source: &Path,
    replica: &Path,
    replica_exists: bool,
) -> Result<DirectorySnapshot, MirrorError> {
    let source_entries = list_entries(source, Side::Source)?;
    let replica_entries = if replica_exists {
        list_entries(replica, Side::Replica)?
    } else {
        Vec::new()
    };

    Ok(DirectorySnapshot::classify(source_entries, replica_entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use tempfile::TempDir;

    #[test]
    fn test_list_entries_kinds() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("file.txt"), "x").unwrap();
        fs::create_dir(temp.path().join("sub")).unwrap();

        let mut entries = list_entries(temp.path(), Side::Source).unwrap();
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(
            entries,
            vec![
                Entry::new("file.txt", EntryKind::File),
                Entry::new("sub", EntryKind::Directory),
            ]
        );
    }

    #[test]
    fn test_list_missing_directory() {
        let temp = TempDir::new().unwrap();
        let result = list_entries(&temp.path().join("missing"), Side::Replica);
        assert!(matches!(result, Err(MirrorError::NotFound { .. })));
    }

    #[test]
    fn test_snapshot_without_replica() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a"), "x").unwrap();

        let snapshot = snapshot(temp.path(), &temp.path().join("nowhere"), false).unwrap();
        assert_eq!(snapshot.source_only.len(), 1);
        assert_eq!(snapshot.source_only[0].name, OsString::from("a"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_follow_on_source_only() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("target.txt"), "x").unwrap();
        std::os::unix::fs::symlink(temp.path().join("target.txt"), temp.path().join("link"))
            .unwrap();
        std::os::unix::fs::symlink(temp.path().join("gone"), temp.path().join("dangling"))
            .unwrap();

        let find = |entries: &[Entry], name: &str| {
            entries
                .iter()
                .find(|e| e.name == OsString::from(name))
                .map(|e| e.kind)
        };

        fs::create_dir(temp.path().join("dir")).unwrap();
        std::os::unix::fs::symlink(temp.path().join("dir"), temp.path().join("dir_link")).unwrap();

        let source = list_entries(temp.path(), Side::Source).unwrap();
        assert_eq!(find(&source, "link"), Some(EntryKind::File));
        assert_eq!(find(&source, "dangling"), Some(EntryKind::Other));
        assert_eq!(find(&source, "dir_link"), Some(EntryKind::Other));

        let replica = list_entries(temp.path(), Side::Replica).unwrap();
        assert_eq!(find(&replica, "link"), Some(EntryKind::Other));
    }

    #[cfg(unix)]
    #[test]
    fn test_unresolvable_source_link_is_an_error() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let locked = temp.path().join("locked");
        let listed = temp.path().join("listed");
        fs::create_dir(&locked).unwrap();
        fs::create_dir(&listed).unwrap();
        fs::write(locked.join("target.txt"), "x").unwrap();
        std::os::unix::fs::symlink(locked.join("target.txt"), listed.join("link")).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits do not bind root
        let readable = fs::metadata(locked.join("target.txt")).is_ok();
        let result = list_entries(&listed, Side::Source);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        if readable {
            return;
        }

        assert!(matches!(result, Err(MirrorError::PermissionDenied { .. })));
    }
}
