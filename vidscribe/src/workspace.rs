use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::error::{Error, Result};

const WORKSPACE_PREFIX: &str = "vidscribe-";

/// Per-request scratch directory.
///
/// Created empty with a unique name; the directory and everything written
/// into it are removed when the guard is dropped, whichever way the request
/// ends.
pub struct Workspace {
    path: PathBuf,
    dir: Option<TempDir>,
}

impl Workspace {
    /// Create a fresh workspace inside `root`. `root` must already exist.
    pub fn create(root: &Path) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(root)
            .map_err(Error::Workspace)?;
        let path = dir.path().to_path_buf();
        debug!(path = %path.display(), "workspace created");
        Ok(Self {
            path,
            dir: Some(dir),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of a file named `name` inside the workspace.
    pub fn join(&self, name: impl AsRef<Path>) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            match dir.close() {
                Ok(()) => debug!(path = %self.path.display(), "workspace removed"),
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "failed to clean up workspace")
                }
            }
        }
    }
}
