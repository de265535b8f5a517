//! Tracked temporary directories.
//!
//! Every source/step call that needs scratch space gets its own private
//! directory from a shared [`TempTracker`]. Tracked paths are removed in one
//! pass at process exit unless the operator asked to preserve them for
//! post-mortem debugging.

use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::Result;

/// Process-wide registry of temporary paths.
#[derive(Debug, Default)]
pub struct TempTracker {
    paths: Mutex<Vec<PathBuf>>,
}

impl TempTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh private temporary directory and track it for
    /// cleanup. The directory outlives this call; deletion happens only in
    /// [`TempTracker::cleanup`].
    pub fn dir(&self, prefix: &str) -> Result<PathBuf> {
        let dir = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir()?
            .keep();
        self.paths
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(dir.clone());
        Ok(dir)
    }

    /// Paths currently tracked.
    pub fn tracked(&self) -> Vec<PathBuf> {
        self.paths
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Remove every tracked path, or just report them when `preserve` is
    /// set. Removal failures are logged and do not stop the pass.
    pub fn cleanup(&self, preserve: bool) {
        let paths: Vec<PathBuf> = self
            .paths
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .drain(..)
            .collect();
        for path in paths {
            if preserve {
                tracing::info!("preserving temp path {}", path.display());
            } else if let Err(e) = std::fs::remove_dir_all(&path) {
                tracing::warn!("temp cleanup of {} failed: {e}", path.display());
            }
        }
    }
}
