//! Tracing subscriber setup.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use treemirror_core::MirrorConfig;

use crate::error::DaemonError;
use crate::sink::EVENT_TARGET;

/// Default filter directive for a `-v` count.
///
/// Mutation events are always kept at info so the log file records them
/// whatever the diagnostic level.
pub fn default_directive(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    format!("{level},{EVENT_TARGET}=info")
}

/// Install the global subscriber.
///
/// Diagnostics go to stderr in compact form. Mutation events are left out of
/// stderr since [`LogSink`](crate::LogSink) already prints them to stdout.
/// When `log_file` is set, every record including mutation events is
/// appended to it with timestamps and no colors. `RUST_LOG` overrides the
/// level derived from `verbosity`.
pub fn init(log_file: Option<&Path>, verbosity: u8) -> Result<(), DaemonError> {
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(verbosity)))
        .map_err(|e| DaemonError::Subscriber(e.to_string()))?;

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .with_filter(filter_fn(|meta| meta.target() != EVENT_TARGET));

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| DaemonError::LogFile {
                    path: path.to_path_buf(),
                    source,
                })?;
            Some(
                fmt::layer()
                    .with_writer(Arc::new(file))
                    .with_ansi(false)
                    .with_target(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| DaemonError::Subscriber(e.to_string()))
}

/// Install the global subscriber, logging to the configured event log.
pub fn init_from_config(config: &MirrorConfig, verbosity: u8) -> Result<(), DaemonError> {
    init(config.log_file.as_deref(), verbosity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_keeps_events() {
        assert_eq!(default_directive(0), "warn,treemirror::event=info");
        assert_eq!(default_directive(2), "debug,treemirror::event=info");
        assert!(default_directive(9).starts_with("trace,"));
    }

    #[test]
    fn test_unwritable_log_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("missing_dir/mirror.log");

        let err = init(Some(&path), 0).unwrap_err();
        assert!(matches!(err, DaemonError::LogFile { .. }));
    }

    #[test]
    fn test_config_log_file_is_used() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut config = MirrorConfig::new(temp.path().join("a"), temp.path().join("b"));
        config.log_file = Some(temp.path().join("no_such_dir/events.log"));

        let err = init_from_config(&config, 0).unwrap_err();
        match err {
            DaemonError::LogFile { path, .. } => {
                assert_eq!(path, temp.path().join("no_such_dir/events.log"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
