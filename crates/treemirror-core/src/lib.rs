//! Core types for treemirror.
//!
//! This crate provides the data structures shared by the reconciliation
//! engine and the daemon: configuration, errors, directory snapshots,
//! mutation events and pass reports.

mod config;
mod entry;
mod error;
mod event;
mod report;

pub use config::{DEFAULT_INTERVAL, MirrorConfig, MirrorConfigBuilder};
pub use entry::{DirectorySnapshot, Entry, EntryKind, SourceOnly};
pub use error::MirrorError;
pub use event::{EventKind, MirrorEvent};
pub use report::PassReport;
