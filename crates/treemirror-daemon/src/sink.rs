//! Event sink that logs mutations and echoes them to stdout.

use tracing::info;
use treemirror_core::MirrorEvent;
use treemirror_sync::EventSink;

/// Tracing target carrying mutation events.
pub const EVENT_TARGET: &str = "treemirror::event";

/// Writes every mutation event to the log and, optionally, to stdout.
#[derive(Debug, Clone)]
pub struct LogSink {
    echo: bool,
    recorded: u64,
}

impl LogSink {
    /// Create a sink that also prints each event line to stdout.
    pub fn new() -> Self {
        Self {
            echo: true,
            recorded: 0,
        }
    }

    /// Create a sink that only writes to the log.
    pub fn quiet() -> Self {
        Self {
            echo: false,
            recorded: 0,
        }
    }

    /// Number of events recorded since creation.
    pub fn recorded(&self) -> u64 {
        self.recorded
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogSink {
    fn record(&mut self, event: &MirrorEvent) {
        info!(
            target: EVENT_TARGET,
            kind = %event.kind,
            source = event.source.as_ref().map(|p| p.display().to_string()),
            destination = %event.destination.display(),
            "{event}"
        );
        if self.echo {
            println!("{event}");
        }
        self.recorded += 1;
    }
}
