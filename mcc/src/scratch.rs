//! Temporary files shared with external processes.

use crate::MccError;
use log::{debug, warn};
use std::{
    collections::BTreeSet,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tempfile::TempDir;

/// Tracks every scratch file handed out during a run.
///
/// Each file is removed exactly once: either explicitly via
/// [`ScratchSpace::release`], or when the `ScratchSpace` is dropped,
/// whichever comes first. Removal failures are logged and otherwise
/// ignored.
#[derive(Debug)]
pub struct ScratchSpace {
    dir: TempDir,
    next_id: usize,
    live: BTreeSet<PathBuf>,
}

impl ScratchSpace {
    /// Creates an empty scratch directory under the system temp dir.
    pub fn new() -> Result<Self, MccError> {
        let dir = tempfile::Builder::new().prefix("mcc.").tempdir()?;
        debug!("scratch; dir: {}", dir.path().display());
        Ok(Self {
            dir,
            next_id: 0,
            live: BTreeSet::new(),
        })
    }

    /// Directory holding this run's scratch files.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Returns a fresh path, unique within this scratch space, and
    /// starts tracking it.
    ///
    /// Nothing is created on disk.
    pub fn acquire(&mut self, label: &str) -> PathBuf {
        self.next_id += 1;
        let path = self.dir.path().join(format!("{:04}_{label}", self.next_id));
        self.live.insert(path.clone());
        path
    }

    /// Removes `path` and stops tracking it.
    ///
    /// Unknown or already released paths are ignored.
    pub fn release(&mut self, path: &Path) {
        if self.live.remove(path) {
            remove(path);
        }
    }

    /// Number of paths acquired but not yet released.
    pub fn live(&self) -> usize {
        self.live.len()
    }
}

impl Drop for ScratchSpace {
    fn drop(&mut self) {
        for path in std::mem::take(&mut self.live) {
            remove(&path);
        }
    }
}

fn remove(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => (),
        Err(e) if e.kind() == ErrorKind::NotFound => (),
        Err(e) => warn!("failed to remove scratch file {}: {e}", path.display()),
    }
}
