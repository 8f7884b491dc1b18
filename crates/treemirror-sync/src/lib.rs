//! Tree reconciliation engine for treemirror.
//!
//! This crate makes a replica directory tree identical to a source tree in a
//! single pass: new entries are copied, changed files are refreshed, common
//! directories are walked and replica-only entries are removed. Each applied
//! mutation is reported to an [`EventSink`].
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use treemirror_sync::{MirrorEvent, ReconcileOptions, Reconciler};
//!
//! let reconciler = Reconciler::new(ReconcileOptions::default());
//! let mut events: Vec<MirrorEvent> = Vec::new();
//! let report = reconciler
//!     .reconcile(Path::new("source"), Path::new("replica"), &mut events)
//!     .unwrap();
//!
//! for event in &events {
//!     println!("{event}");
//! }
//! println!("{}", report.summary());
//! ```

mod apply;
mod compare;
mod listing;
mod reconciler;
mod sink;

pub use compare::files_equal;
pub use listing::{Side, list_entries, snapshot};
pub use reconciler::{ReconcileOptions, Reconciler, reconcile};
pub use sink::{EventSink, FnSink, NullSink, sink_fn};

// Re-export core types for convenience
pub use treemirror_core::{EventKind, MirrorError, MirrorEvent, PassReport};
