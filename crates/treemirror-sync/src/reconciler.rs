//! One-way tree reconciliation.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, debug_span, trace};

use treemirror_core::{EntryKind, MirrorConfig, MirrorError, MirrorEvent, PassReport};

use crate::apply::{copy_file, create_dir, file_size, remove_entry};
use crate::compare::files_equal;
use crate::listing::snapshot;
use crate::sink::EventSink;

/// Options controlling how a pass applies its mutations.
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Report mutations without applying them.
    pub dry_run: bool,
    /// Copy source modification times onto replica files.
    pub preserve_timestamps: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            preserve_timestamps: true,
        }
    }
}

impl From<&MirrorConfig> for ReconcileOptions {
    fn from(config: &MirrorConfig) -> Self {
        Self {
            dry_run: config.dry_run,
            preserve_timestamps: config.preserve_timestamps,
        }
    }
}

/// A unit of pending work on the walk stack.
#[derive(Debug)]
enum Step {
    /// List and classify a directory pair, then schedule its children.
    Visit {
        source: PathBuf,
        replica: PathBuf,
        replica_exists: bool,
    },
    /// Copy a file that is missing from the replica.
    Copy {
        source: PathBuf,
        replica: PathBuf,
        displaced: Option<EntryKind>,
    },
    /// Create a directory that is missing from the replica, then visit it.
    CreateDir {
        source: PathBuf,
        replica: PathBuf,
        displaced: Option<EntryKind>,
    },
    /// Compare a file present on both sides and refresh it if it differs.
    Update { source: PathBuf, replica: PathBuf },
    /// Delete a replica-only entry.
    Remove { replica: PathBuf, kind: EntryKind },
}

/// Makes a replica tree identical to a source tree.
///
/// Holds no state between passes: every call re-lists both trees.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    options: ReconcileOptions,
    cancel: CancellationToken,
}

impl Reconciler {
    /// Create a reconciler with the given options.
    pub fn new(options: ReconcileOptions) -> Self {
        Self {
            options,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop the pass at the next step once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Run one full pass from `source` onto `replica`.
    ///
    /// Both roots must be existing directories. Each mutation is reported to
    /// `sink` after it has been applied. The first I/O error aborts the pass;
    /// mutations already reported stay in place and the next pass picks up
    /// from whatever state the replica is in.
    pub fn reconcile<S: EventSink + ?Sized>(
        &self,
        source: &Path,
        replica: &Path,
        sink: &mut S,
    ) -> Result<PassReport, MirrorError> {
        let _span = debug_span!("pass", source = %source.display(), replica = %replica.display())
            .entered();
        let start = Instant::now();

        ensure_directory(source)?;
        ensure_directory(replica)?;

        let mut report = PassReport::new(self.options.dry_run);
        let mut pass = Pass {
            options: &self.options,
            report: &mut report,
            sink,
        };

        let mut stack = vec![Step::Visit {
            source: source.to_path_buf(),
            replica: replica.to_path_buf(),
            replica_exists: true,
        }];

        while let Some(step) = stack.pop() {
            if self.cancel.is_cancelled() {
                debug!("Pass cancelled with {} steps pending", stack.len() + 1);
                return Err(MirrorError::Cancelled);
            }
            pass.run(step, &mut stack)?;
        }

        report.duration = start.elapsed();
        debug!("{}", report.summary());
        Ok(report)
    }
}

/// Reconcile `replica` against `source` with default options.
pub fn reconcile<S: EventSink + ?Sized>(
    source: &Path,
    replica: &Path,
    sink: &mut S,
) -> Result<PassReport, MirrorError> {
    Reconciler::default().reconcile(source, replica, sink)
}

fn ensure_directory(path: &Path) -> Result<(), MirrorError> {
    let metadata = std::fs::metadata(path).map_err(|e| MirrorError::io(path, e))?;
    if !metadata.is_dir() {
        return Err(MirrorError::NotADirectory {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// State of a single pass.
struct Pass<'a, S: ?Sized> {
    options: &'a ReconcileOptions,
    report: &'a mut PassReport,
    sink: &'a mut S,
}

impl<S: EventSink + ?Sized> Pass<'_, S> {
    fn run(&mut self, step: Step, stack: &mut Vec<Step>) -> Result<(), MirrorError> {
        match step {
            Step::Visit {
                source,
                replica,
                replica_exists,
            } => self.visit(source, replica, replica_exists, stack),
            Step::Copy {
                source,
                replica,
                displaced,
            } => {
                self.clear(&replica, displaced)?;
                let bytes = self.copy(&source, &replica)?;
                self.report.add_bytes(bytes);
                self.emit(MirrorEvent::copied_file(source, replica));
                Ok(())
            }
            Step::CreateDir {
                source,
                replica,
                displaced,
            } => {
                self.clear(&replica, displaced)?;
                if !self.options.dry_run {
                    create_dir(&replica)?;
                }
                self.emit(MirrorEvent::created_folder(&replica));
                stack.push(Step::Visit {
                    source,
                    replica,
                    replica_exists: !self.options.dry_run,
                });
                Ok(())
            }
            Step::Update { source, replica } => {
                self.report.files_compared += 1;
                if files_equal(&source, &replica)? {
                    return Ok(());
                }
                let bytes = self.copy(&source, &replica)?;
                self.report.add_bytes(bytes);
                self.emit(MirrorEvent::updated_file(source, replica));
                Ok(())
            }
            Step::Remove { replica, kind } => self.remove(&replica, kind),
        }
    }

    /// Schedule the children of a directory pair.
    ///
    /// Steps are pushed in reverse so they pop in this order: copy new files,
    /// create new directories (each fully walked before moving on), update
    /// changed files, walk common directories, remove extras.
    fn visit(
        &mut self,
        source: PathBuf,
        replica: PathBuf,
        replica_exists: bool,
        stack: &mut Vec<Step>,
    ) -> Result<(), MirrorError> {
        trace!(source = %source.display(), "Visiting directory");
        self.report.directories_visited += 1;

        let snapshot = snapshot(&source, &replica, replica_exists)?;
        if snapshot.mismatch_count() > 0 {
            debug!(
                "{} entries under {} changed type, replacing",
                snapshot.mismatch_count(),
                replica.display()
            );
        }

        for entry in snapshot.replica_only.into_iter().rev() {
            stack.push(Step::Remove {
                replica: replica.join(&entry.name),
                kind: entry.kind,
            });
        }
        for name in snapshot.common_dirs.into_iter().rev() {
            stack.push(Step::Visit {
                source: source.join(&name),
                replica: replica.join(&name),
                replica_exists: true,
            });
        }
        for name in snapshot.common_files.into_iter().rev() {
            stack.push(Step::Update {
                source: source.join(&name),
                replica: replica.join(&name),
            });
        }

        let (dirs, files): (Vec<_>, Vec<_>) = snapshot
            .source_only
            .into_iter()
            .partition(|entry| entry.kind.is_dir());

        for entry in dirs.into_iter().rev() {
            stack.push(Step::CreateDir {
                source: source.join(&entry.name),
                replica: replica.join(&entry.name),
                displaced: entry.displaced,
            });
        }
        for entry in files.into_iter().rev() {
            stack.push(Step::Copy {
                source: source.join(&entry.name),
                replica: replica.join(&entry.name),
                displaced: entry.displaced,
            });
        }

        Ok(())
    }

    fn copy(&mut self, source: &Path, replica: &Path) -> Result<u64, MirrorError> {
        if self.options.dry_run {
            file_size(source)
        } else {
            copy_file(source, replica, self.options.preserve_timestamps)
        }
    }

    /// Remove a replica entry whose type no longer matches the source.
    fn clear(&mut self, replica: &Path, displaced: Option<EntryKind>) -> Result<(), MirrorError> {
        match displaced {
            Some(kind) => self.remove(replica, kind),
            None => Ok(()),
        }
    }

    fn remove(&mut self, replica: &Path, kind: EntryKind) -> Result<(), MirrorError> {
        if !self.options.dry_run {
            remove_entry(replica, kind)?;
        }
        let event = match kind {
            EntryKind::Directory => MirrorEvent::removed_folder(replica),
            EntryKind::File | EntryKind::Other => MirrorEvent::removed_file(replica),
        };
        self.emit(event);
        Ok(())
    }

    fn emit(&mut self, event: MirrorEvent) {
        self.report.record(&event);
        self.sink.record(&event);
    }
}
