//! Directory entry kinds and per-directory snapshots.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::FileType;

use serde::{Deserialize, Serialize};

/// Type of a directory entry, as far as mirroring is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Anything else (symlink left unresolved, socket, device, fifo).
    Other,
}

impl EntryKind {
    /// Classify a file type.
    pub fn from_file_type(file_type: FileType) -> Self {
        if file_type.is_dir() {
            Self::Directory
        } else if file_type.is_file() {
            Self::File
        } else {
            Self::Other
        }
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, Self::Directory)
    }

    /// Check if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File)
    }
}

/// One immediate child of a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// File name relative to its parent.
    pub name: OsString,
    /// Kind of the entry.
    pub kind: EntryKind,
}

impl Entry {
    /// Create a new entry.
    pub fn new(name: impl Into<OsString>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// A name that exists only in the source, or whose replica counterpart has
/// the wrong type and must be replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOnly {
    /// File name relative to its parent.
    pub name: OsString,
    /// Kind of the source entry (never [`EntryKind::Other`]).
    pub kind: EntryKind,
    /// Kind of the replica entry of the same name that has to go first.
    pub displaced: Option<EntryKind>,
}

/// Classification of one directory pair's immediate children.
///
/// The four sets are disjoint and together cover every name that exists
/// in either directory, except unsupported source entries, which count as
/// absent. Each set is sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectorySnapshot {
    /// Names to create in the replica.
    pub source_only: Vec<SourceOnly>,
    /// Names to remove from the replica.
    pub replica_only: Vec<Entry>,
    /// Names that are regular files on both sides.
    pub common_files: Vec<OsString>,
    /// Names that are directories on both sides.
    pub common_dirs: Vec<OsString>,
}

impl DirectorySnapshot {
    /// Classify the children of a source directory against its replica.
    ///
    /// `replica` may be empty when the replica directory does not exist yet.
    pub fn classify(source: Vec<Entry>, replica: Vec<Entry>) -> Self {
        let mut replica: BTreeMap<OsString, EntryKind> = replica
            .into_iter()
            .map(|entry| (entry.name, entry.kind))
            .collect();
        let source: BTreeMap<OsString, EntryKind> = source
            .into_iter()
            .filter(|entry| entry.kind != EntryKind::Other)
            .map(|entry| (entry.name, entry.kind))
            .collect();

        let mut snapshot = Self::default();

        for (name, kind) in source {
            match replica.remove(&name) {
                None => snapshot.source_only.push(SourceOnly {
                    name,
                    kind,
                    displaced: None,
                }),
                Some(replica_kind) if replica_kind == kind => {
                    if kind.is_dir() {
                        snapshot.common_dirs.push(name);
                    } else {
                        snapshot.common_files.push(name);
                    }
                }
                Some(replica_kind) => snapshot.source_only.push(SourceOnly {
                    name,
                    kind,
                    displaced: Some(replica_kind),
                }),
            }
        }

        snapshot.replica_only = replica
            .into_iter()
            .map(|(name, kind)| Entry { name, kind })
            .collect();

        snapshot
    }

    /// Total number of names covered by the snapshot.
    pub fn len(&self) -> usize {
        self.source_only.len()
            + self.replica_only.len()
            + self.common_files.len()
            + self.common_dirs.len()
    }

    /// Check if both directories are empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of names with a type mismatch between source and replica.
    pub fn mismatch_count(&self) -> usize {
        self.source_only
            .iter()
            .filter(|entry| entry.displaced.is_some())
            .count()
    }
}
