//! Root directory preparation.

use std::fs;
use std::path::Path;

use tracing::info;
use treemirror_core::{MirrorConfig, MirrorError};

/// Create both mirror roots if they are missing and check they can be used.
///
/// Fails if either root exists as something other than a directory, cannot be
/// created, or if one root is nested inside the other.
pub fn prepare_roots(config: &MirrorConfig) -> Result<(), MirrorError> {
    ensure_root(&config.source)?;
    ensure_root(&config.replica)?;
    config.ensure_disjoint_roots()
}

fn ensure_root(path: &Path) -> Result<(), MirrorError> {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(MirrorError::NotADirectory {
            path: path.to_path_buf(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            fs::create_dir_all(path).map_err(|e| MirrorError::io(path, e))?;
            info!("Created root directory {}", path.display());
            Ok(())
        }
        Err(e) => Err(MirrorError::io(path, e)),
    }
}
