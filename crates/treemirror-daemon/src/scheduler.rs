//! Polling loop that runs reconciliation passes on a fixed cadence.

use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use treemirror_core::{MirrorConfig, MirrorError, PassReport};
use treemirror_sync::{EventSink, ReconcileOptions, Reconciler};

/// Aggregate outcome of a scheduler run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Passes that ran to completion.
    pub passes_run: u64,
    /// Passes that stopped on an error or timed out.
    pub passes_failed: u64,
    /// Mutation events across all completed passes.
    pub mutations: u64,
    /// Bytes written across all completed passes.
    pub bytes_written: u64,
}

/// Runs a pass immediately, then one pass per interval until shut down.
///
/// Passes run on the blocking thread pool one at a time. A failed pass is
/// logged and the next poll retries the whole tree.
pub struct Scheduler<S> {
    config: MirrorConfig,
    sink: Arc<Mutex<S>>,
    shutdown: CancellationToken,
}

impl<S: EventSink + Send + 'static> Scheduler<S> {
    /// Create a scheduler reporting events to `sink`.
    pub fn new(config: MirrorConfig, sink: S) -> Self {
        Self {
            config,
            sink: Arc::new(Mutex::new(sink)),
            shutdown: CancellationToken::new(),
        }
    }

    /// Token that stops the loop and cancels any in-flight pass.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Request shutdown.
    pub fn stop(&self) {
        self.shutdown.cancel();
    }

    /// The sink shared with running passes.
    pub fn sink(&self) -> Arc<Mutex<S>> {
        Arc::clone(&self.sink)
    }

    /// Poll until shutdown, or for a single pass when configured to run once.
    pub async fn run(&self) -> SchedulerStats {
        let mut stats = SchedulerStats::default();

        loop {
            if self.shutdown.is_cancelled() {
                break;
            }

            match self.run_pass().await {
                Ok(report) => {
                    stats.passes_run += 1;
                    stats.mutations += report.total_mutations();
                    stats.bytes_written += report.bytes_written;
                    if report.is_noop() {
                        debug!("{}", report.summary());
                    } else {
                        info!("{}", report.summary());
                    }
                }
                Err(MirrorError::Cancelled) if self.shutdown.is_cancelled() => {
                    info!("Pass interrupted by shutdown");
                    break;
                }
                Err(e) => {
                    stats.passes_failed += 1;
                    error!(path = ?e.path(), "Pass failed: {}", e);
                }
            }

            if self.config.run_once {
                break;
            }

            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.config.interval) => {}
            }
        }

        stats
    }

    async fn run_pass(&self) -> Result<PassReport, MirrorError> {
        let cancel = self.shutdown.child_token();
        let reconciler =
            Reconciler::new(ReconcileOptions::from(&self.config)).with_cancellation(cancel.clone());
        let source = self.config.source.clone();
        let replica = self.config.replica.clone();
        let sink = Arc::clone(&self.sink);

        let mut task = tokio::task::spawn_blocking(move || {
            let mut sink = sink.lock().unwrap_or_else(PoisonError::into_inner);
            reconciler.reconcile(&source, &replica, &mut *sink)
        });

        let joined = match self.config.pass_timeout {
            Some(limit) => match tokio::time::timeout(limit, &mut task).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!("Pass exceeded {:?}, cancelling", limit);
                    cancel.cancel();
                    // Cancellation lands between steps, so a blocked read or
                    // copy still has to return first
                    task.await
                }
            },
            None => task.await,
        };

        joined.unwrap_or_else(|e| {
            Err(MirrorError::io(
                &self.config.replica,
                io::Error::other(format!("pass task failed: {e}")),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;
    use treemirror_core::MirrorEvent;

    fn config(temp: &TempDir) -> MirrorConfig {
        let source = temp.path().join("src");
        let replica = temp.path().join("dst");
        fs::create_dir(&source).unwrap();
        fs::create_dir(&replica).unwrap();
        let mut config = MirrorConfig::new(source, replica);
        config.interval = Duration::from_millis(20);
        config
    }

    #[tokio::test]
    async fn test_run_once() {
        let temp = TempDir::new().unwrap();
        let mut config = config(&temp);
        config.run_once = true;
        fs::write(config.source.join("a.txt"), "a").unwrap();

        let scheduler = Scheduler::new(config.clone(), Vec::<MirrorEvent>::new());
        let stats = scheduler.run().await;

        assert_eq!(stats.passes_run, 1);
        assert_eq!(stats.mutations, 1);
        assert_eq!(stats.bytes_written, 1);
        assert!(config.replica.join("a.txt").exists());
    }

    #[tokio::test]
    async fn test_stop_ends_loop() {
        let temp = TempDir::new().unwrap();
        let scheduler = Arc::new(Scheduler::new(config(&temp), Vec::<MirrorEvent>::new()));

        let runner = Arc::clone(&scheduler);
        let handle = tokio::spawn(async move { runner.run().await });

        tokio::time::sleep(Duration::from_millis(70)).await;
        scheduler.stop();

        let stats = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(stats.passes_run >= 1);
        assert_eq!(stats.passes_failed, 0);
    }

    #[tokio::test]
    async fn test_failed_pass_is_counted() {
        let temp = TempDir::new().unwrap();
        let mut config = config(&temp);
        config.run_once = true;
        fs::remove_dir(&config.replica).unwrap();

        let scheduler = Scheduler::new(config, Vec::<MirrorEvent>::new());
        let stats = scheduler.run().await;

        assert_eq!(stats.passes_run, 0);
        assert_eq!(stats.passes_failed, 1);
    }
}
