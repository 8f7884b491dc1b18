//! Polling daemon for treemirror.
//!
//! This crate wires the reconciliation engine to the outside world: it
//! prepares the root directories, installs logging, reports each mutation
//! through a [`LogSink`] and drives passes on a fixed interval until the
//! process is interrupted.

mod error;
pub mod logging;
mod roots;
mod scheduler;
mod sink;

pub use error::DaemonError;
pub use roots::prepare_roots;
pub use scheduler::{Scheduler, SchedulerStats};
pub use sink::{EVENT_TARGET, LogSink};

use tracing::{info, warn};
use treemirror_core::MirrorConfig;

/// Run the daemon to completion on a new multi-threaded runtime.
pub fn run(config: MirrorConfig) -> Result<SchedulerStats, DaemonError> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(DaemonError::Runtime)?;

    rt.block_on(run_async(config))
}

/// Prepare the roots, then poll until Ctrl-C or, in run-once mode, after a
/// single pass.
pub async fn run_async(config: MirrorConfig) -> Result<SchedulerStats, DaemonError> {
    prepare_roots(&config)?;

    info!(
        "Mirroring {} to {} every {:?}{}",
        config.source.display(),
        config.replica.display(),
        config.interval,
        if config.dry_run { " (dry run)" } else { "" }
    );

    let scheduler = Scheduler::new(config, LogSink::new());
    let shutdown = scheduler.shutdown_token();

    let signal_token = shutdown.clone();
    let listener = tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    warn!("Cannot listen for Ctrl-C: {}", e);
                    return;
                }
                signal_token.cancel();
            }
            _ = signal_token.cancelled() => {}
        }
    });

    let stats = scheduler.run().await;

    if shutdown.is_cancelled() {
        println!("program terminated.");
    } else {
        shutdown.cancel();
    }
    let _ = listener.await;

    info!(
        "{} passes, {} failed, {} mutations",
        stats.passes_run, stats.passes_failed, stats.mutations
    );
    Ok(stats)
}
