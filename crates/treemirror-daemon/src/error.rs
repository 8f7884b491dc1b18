//! Error types for the daemon.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use treemirror_core::MirrorError;

/// Errors that stop the daemon before or outside a pass.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// The mirror roots could not be prepared.
    #[error("Setup failed: {0}")]
    Setup(#[from] MirrorError),

    /// The log file could not be opened.
    #[error("Cannot open log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A global tracing subscriber could not be installed.
    #[error("Cannot initialize logging: {0}")]
    Subscriber(String),

    /// The async runtime could not be started.
    #[error("Cannot start runtime: {0}")]
    Runtime(#[source] io::Error),
}
