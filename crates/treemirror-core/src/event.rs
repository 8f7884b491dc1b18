//! Mutation events emitted by a pass.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter};

/// The kind of mutation applied to the replica.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
    /// A new file was copied into the replica.
    CopiedFile,
    /// A new directory was created in the replica.
    CreatedFolder,
    /// An existing replica file was overwritten with new content.
    UpdatedFile,
    /// A replica-only file was deleted.
    RemovedFile,
    /// A replica-only directory was deleted with its contents.
    RemovedFolder,
}

/// One mutation of the replica tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorEvent {
    /// What happened.
    pub kind: EventKind,
    /// Source path the content came from, for copies and updates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    /// Replica path that was mutated.
    pub destination: PathBuf,
}

impl MirrorEvent {
    /// A file copied from `source` to `destination`.
    pub fn copied_file(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            kind: EventKind::CopiedFile,
            source: Some(source.into()),
            destination: destination.into(),
        }
    }

    /// A folder created at `destination`.
    pub fn created_folder(destination: impl Into<PathBuf>) -> Self {
        Self {
            kind: EventKind::CreatedFolder,
            source: None,
            destination: destination.into(),
        }
    }

    /// A replica file refreshed from `source`.
    pub fn updated_file(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            kind: EventKind::UpdatedFile,
            source: Some(source.into()),
            destination: destination.into(),
        }
    }

    /// A file removed from `destination`.
    pub fn removed_file(destination: impl Into<PathBuf>) -> Self {
        Self {
            kind: EventKind::RemovedFile,
            source: None,
            destination: destination.into(),
        }
    }

    /// A folder removed from `destination`.
    pub fn removed_folder(destination: impl Into<PathBuf>) -> Self {
        Self {
            kind: EventKind::RemovedFolder,
            source: None,
            destination: destination.into(),
        }
    }
}

impl fmt::Display for MirrorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = self
            .source
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let destination = self.destination.display();

        match self.kind {
            EventKind::CopiedFile => write!(f, "Copied file {source} to {destination}"),
            EventKind::CreatedFolder => write!(f, "Created folder {destination}"),
            EventKind::UpdatedFile => write!(f, "Updated file {source} in {destination}"),
            EventKind::RemovedFile => write!(f, "Removed file {destination}"),
            EventKind::RemovedFolder => write!(f, "Removed folder {destination}"),
        }
    }
}
