use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

use crate::aggregator::constants::WORKDIR_PREFIX;
use crate::aggregator::error::Result;

static WORKDIR_SEQ: AtomicU64 = AtomicU64::new(0);

/// Scoped working directory holding the shard files. The directory is
/// removed when the guard drops, on every exit path.
pub struct ScopedWorkDir {
    path: PathBuf,
}

impl ScopedWorkDir {
    /// Creates `<parent>/tmp-<pid>-<seq>`. The name is unique per process
    /// instance; an existing directory of the same name is an error rather
    /// than a directory to adopt.
    pub fn create(parent: &Path) -> Result<Self> {
        let seq = WORKDIR_SEQ.fetch_add(1, Ordering::Relaxed);
        let path = parent.join(format!("{}{}-{}", WORKDIR_PREFIX, std::process::id(), seq));
        fs::create_dir_all(parent)?;
        fs::create_dir(&path)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScopedWorkDir {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_dir_all(&self.path) {
            warn!(
                "failed to remove working directory {}: {}",
                self.path.display(),
                err
            );
        }
    }
}
