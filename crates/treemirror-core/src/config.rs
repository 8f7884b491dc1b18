//! Mirror configuration types.

use std::path::{Path, PathBuf};
use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::MirrorError;

/// Default delay between two passes.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// Configuration for a mirroring daemon.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct MirrorConfig {
    /// Authoritative tree, never written to.
    pub source: PathBuf,

    /// Tree kept identical to the source.
    pub replica: PathBuf,

    /// Delay between the end of one pass and the start of the next.
    #[builder(default = "DEFAULT_INTERVAL")]
    #[serde(default = "default_interval")]
    pub interval: Duration,

    /// Append-only event log.
    #[builder(setter(into, strip_option), default)]
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Report mutations without applying them.
    #[builder(default = "false")]
    #[serde(default)]
    pub dry_run: bool,

    /// Copy the source modification time onto replica files.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub preserve_timestamps: bool,

    /// Deadline after which an in-flight pass is cancelled.
    ///
    /// Cancellation is cooperative: the pass stops at the next step boundary.
    /// A single filesystem call that hangs is not interrupted, and the
    /// scheduler waits for it before the pass is reported as failed.
    #[builder(setter(into, strip_option), default)]
    #[serde(default)]
    pub pass_timeout: Option<Duration>,

    /// Run a single pass and stop.
    #[builder(default = "false")]
    #[serde(default)]
    pub run_once: bool,
}

fn default_true() -> bool {
    true
}

fn default_interval() -> Duration {
    DEFAULT_INTERVAL
}

impl MirrorConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        let source = match self.source {
            Some(ref source) if !source.as_os_str().is_empty() => source,
            Some(_) => return Err("Source path cannot be empty".to_string()),
            None => return Err("Source path is required".to_string()),
        };
        let replica = match self.replica {
            Some(ref replica) if !replica.as_os_str().is_empty() => replica,
            Some(_) => return Err("Replica path cannot be empty".to_string()),
            None => return Err("Replica path is required".to_string()),
        };
        if source == replica {
            return Err("Source and replica must be different paths".to_string());
        }

        let run_once = self.run_once.unwrap_or(false);
        if !run_once && self.interval == Some(Duration::ZERO) {
            return Err("Interval must be greater than zero".to_string());
        }
        if self.pass_timeout == Some(Some(Duration::ZERO)) {
            return Err("Pass timeout must be greater than zero".to_string());
        }
        Ok(())
    }
}

impl MirrorConfig {
    /// Create a new mirror config builder.
    pub fn builder() -> MirrorConfigBuilder {
        MirrorConfigBuilder::default()
    }

    /// Create a config with default settings for a pair of roots.
    pub fn new(source: impl Into<PathBuf>, replica: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            replica: replica.into(),
            interval: DEFAULT_INTERVAL,
            log_file: None,
            dry_run: false,
            preserve_timestamps: true,
            pass_timeout: None,
            run_once: false,
        }
    }

    /// Reject roots that resolve to the same directory or nest inside each other.
    ///
    /// Both roots must already exist.
    pub fn ensure_disjoint_roots(&self) -> Result<(), MirrorError> {
        let source = canonical(&self.source)?;
        let replica = canonical(&self.replica)?;

        if source.starts_with(&replica) || replica.starts_with(&source) {
            return Err(MirrorError::OverlappingRoots {
                source_root: source,
                replica_root: replica,
            });
        }
        Ok(())
    }
}

fn canonical(path: &Path) -> Result<PathBuf, MirrorError> {
    path.canonicalize().map_err(|e| MirrorError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = MirrorConfig::builder()
            .source("/data/src")
            .replica("/backup/dst")
            .interval(Duration::from_secs(5))
            .log_file("/var/log/mirror.log")
            .build()
            .unwrap();

        assert_eq!(config.source, PathBuf::from("/data/src"));
        assert_eq!(config.interval, Duration::from_secs(5));
        assert_eq!(config.log_file, Some(PathBuf::from("/var/log/mirror.log")));
        assert!(config.preserve_timestamps);
        assert!(!config.dry_run);
        assert!(config.pass_timeout.is_none());
    }

    #[test]
    fn test_config_simple() {
        let config = MirrorConfig::new("a", "b");
        assert_eq!(config.interval, DEFAULT_INTERVAL);
        assert!(!config.run_once);
    }

    #[test]
    fn test_builder_rejects_missing_replica() {
        let err = MirrorConfig::builder().source("a").build().unwrap_err();
        assert!(err.to_string().contains("Replica path is required"));
    }

    #[test]
    fn test_builder_rejects_same_paths() {
        let err = MirrorConfig::builder()
            .source("same")
            .replica("same")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("must be different"));
    }

    #[test]
    fn test_builder_rejects_zero_interval() {
        let result = MirrorConfig::builder()
            .source("a")
            .replica("b")
            .interval(Duration::ZERO)
            .build();
        assert!(result.is_err());

        // A single pass never sleeps, so the interval is irrelevant
        let config = MirrorConfig::builder()
            .source("a")
            .replica("b")
            .interval(Duration::ZERO)
            .run_once(true)
            .build()
            .unwrap();
        assert!(config.run_once);
    }

    #[test]
    fn test_disjoint_roots() {
        let temp = tempfile::TempDir::new().unwrap();
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");
        std::fs::create_dir(&src).unwrap();
        std::fs::create_dir(&dst).unwrap();

        assert!(MirrorConfig::new(&src, &dst).ensure_disjoint_roots().is_ok());
    }

    #[test]
    fn test_nested_roots_rejected() {
        let temp = tempfile::TempDir::new().unwrap();
        let src = temp.path().join("src");
        let nested = src.join("replica");
        std::fs::create_dir_all(&nested).unwrap();

        let err = MirrorConfig::new(&src, &nested)
            .ensure_disjoint_roots()
            .unwrap_err();
        assert!(matches!(err, MirrorError::OverlappingRoots { .. }));

        let err = MirrorConfig::new(&nested, &src)
            .ensure_disjoint_roots()
            .unwrap_err();
        assert!(matches!(err, MirrorError::OverlappingRoots { .. }));
    }
}
