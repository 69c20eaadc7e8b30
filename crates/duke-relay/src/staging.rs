//! Per-call staging directories

use std::path::{Path, PathBuf};

use tempfile::TempDir;

const STAGING_PREFIX: &str = "relay-";

/// A uniquely named directory holding the one local file of a composite
/// operation
///
/// The directory is removed by [`StagingArea::cleanup`] or, failing that,
/// when the value is dropped.
pub struct StagingArea {
    dir: TempDir,
}

impl StagingArea {
    /// Create a staging directory under `parent`, or the system temp dir
    pub fn create(parent: Option<&Path>) -> std::io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(STAGING_PREFIX);

        let dir = match parent {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };
        tracing::debug!("Staging in {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of a file inside the staging directory
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Remove the directory and everything in it; failures are logged
    pub fn cleanup(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(err) = self.dir.close() {
            tracing::warn!("Failed to remove staging directory {}: {}", path.display(), err);
        }
    }
}
