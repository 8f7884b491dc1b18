//! Summary of a completed pass.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::event::{EventKind, MirrorEvent};

/// Tallies for one reconciliation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassReport {
    /// When the pass started.
    pub started_at: DateTime<Utc>,
    /// Wall time spent in the pass.
    pub duration: Duration,
    /// Number of events per kind.
    pub counts: HashMap<EventKind, u64>,
    /// Bytes written into the replica.
    pub bytes_written: u64,
    /// Directory pairs listed.
    pub directories_visited: u64,
    /// Common files compared byte for byte.
    pub files_compared: u64,
    /// Whether mutations were only reported.
    pub dry_run: bool,
}

impl PassReport {
    /// Start a new report.
    pub fn new(dry_run: bool) -> Self {
        Self {
            started_at: Utc::now(),
            duration: Duration::ZERO,
            counts: HashMap::new(),
            bytes_written: 0,
            directories_visited: 0,
            files_compared: 0,
            dry_run,
        }
    }

    /// Count an event.
    pub fn record(&mut self, event: &MirrorEvent) {
        *self.counts.entry(event.kind).or_default() += 1;
    }

    /// Add bytes written by a copy.
    pub fn add_bytes(&mut self, bytes: u64) {
        self.bytes_written += bytes;
    }

    /// Number of events of a kind.
    pub fn count(&self, kind: EventKind) -> u64 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Number of events of all kinds.
    pub fn total_mutations(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Check if the replica was already in sync.
    pub fn is_noop(&self) -> bool {
        self.total_mutations() == 0
    }

    /// Get a human-readable summary of the pass.
    pub fn summary(&self) -> String {
        if self.is_noop() {
            return format!(
                "Replica up to date ({} directories, {} files compared in {:.2}s)",
                self.directories_visited,
                self.files_compared,
                self.duration.as_secs_f64()
            );
        }

        let parts: Vec<String> = EventKind::iter()
            .filter_map(|kind| match self.count(kind) {
                0 => None,
                n => Some(format!("{n} {kind}")),
            })
            .collect();

        format!(
            "{}{}, {} written in {:.2}s",
            if self.dry_run { "[dry run] " } else { "" },
            parts.join(", "),
            humansize::format_size(self.bytes_written, humansize::BINARY),
            self.duration.as_secs_f64()
        )
    }
}

impl Default for PassReport {
    fn default() -> Self {
        Self::new(false)
    }
}
