//! Error types for mirroring operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while preparing roots or running a pass.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A root exists but is not a directory.
    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// One root is the same as, or nested inside, the other.
    #[error("Source {source_root} and replica {replica_root} overlap")]
    OverlappingRoots {
        source_root: PathBuf,
        replica_root: PathBuf,
    },

    /// The pass was cancelled before it finished.
    #[error("Pass cancelled")]
    Cancelled,
}

impl MirrorError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Whether this error can only come out of startup validation.
    ///
    /// Setup errors are fatal; everything else fails a single pass and is
    /// retried by the next poll.
    pub fn is_setup(&self) -> bool {
        matches!(self, Self::NotADirectory { .. } | Self::OverlappingRoots { .. })
    }

    /// The path the error refers to, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::PermissionDenied { path }
            | Self::NotFound { path }
            | Self::Io { path, .. }
            | Self::NotADirectory { path } => Some(path),
            _ => None,
        }
    }
}
