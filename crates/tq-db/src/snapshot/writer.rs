//! Snapshot file writer.
//!
//! Writes never touch the target file directly: the new document is staged
//! in a sibling file and renamed over the target, so readers observe either
//! the old or the new snapshot and never a partial one.

use std::path::{Path, PathBuf};

use tq_core::snapshot::Snapshot;

use crate::error::StoreError;

/// Owns the document-store location.
pub struct SnapshotWriter {
    path: PathBuf,
}

impl SnapshotWriter {
    /// Point the writer at `path`, creating its parent directory.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Snapshot` if the directory cannot be created.
    pub fn new(path: PathBuf) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::snapshot(parent, e))?;
        }
        Ok(Self { path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a document store file exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read the current snapshot, `None` when the file does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Snapshot` on I/O or JSON errors.
    pub fn read(&self) -> Result<Option<Snapshot>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        read_snapshot_file(&self.path).map(Some)
    }

    /// Stage `snapshot` next to the target without replacing it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Snapshot` if the staged file cannot be written.
    pub fn stage(&self, snapshot: &Snapshot) -> Result<StagedSnapshot, StoreError> {
        StagedSnapshot::write(&self.path, snapshot)
    }

    /// Stage and install in one step.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Snapshot` if staging or the rename fails.
    pub fn write(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        self.stage(snapshot)?.commit()
    }
}

/// A fully written snapshot waiting to be renamed into place.
///
/// Dropping it without [`StagedSnapshot::commit`] removes the staged file.
#[derive(Debug)]
pub struct StagedSnapshot {
    staged: PathBuf,
    target: PathBuf,
    installed: bool,
}

impl StagedSnapshot {
    fn write(target: &Path, snapshot: &Snapshot) -> Result<Self, StoreError> {
        let staged = staged_path(target);
        let json = serde_json::to_vec_pretty(snapshot).map_err(|e| StoreError::snapshot(target, e))?;
        std::fs::write(&staged, json).map_err(|e| StoreError::snapshot(&staged, e))?;
        Ok(Self {
            staged,
            target: target.to_path_buf(),
            installed: false,
        })
    }

    /// Path of the staged file.
    #[must_use]
    pub fn staged_path(&self) -> &Path {
        &self.staged
    }

    /// Atomically replace the target with the staged file.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Snapshot` if the rename fails. The staged file is
    /// removed in that case and the target is left untouched.
    pub fn commit(mut self) -> Result<(), StoreError> {
        std::fs::rename(&self.staged, &self.target)
            .map_err(|e| StoreError::snapshot(&self.target, e))?;
        self.installed = true;
        Ok(())
    }
}

impl Drop for StagedSnapshot {
    fn drop(&mut self) {
        if !self.installed {
            let _ = std::fs::remove_file(&self.staged);
        }
    }
}

/// `<dir>/.<file>.staged`
fn staged_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map_or_else(|| "snapshot".into(), |n| n.to_string_lossy().into_owned());
    target.with_file_name(format!(".{name}.staged"))
}

/// Parse a snapshot file.
///
/// # Errors
///
/// Returns `StoreError::Snapshot` on I/O or JSON errors.
pub fn read_snapshot_file(path: &Path) -> Result<Snapshot, StoreError> {
    let bytes = std::fs::read(path).map_err(|e| StoreError::snapshot(path, e))?;
    serde_json::from_slice(&bytes).map_err(|e| StoreError::snapshot(path, e))
}

/// Write a snapshot to an arbitrary path with the same stage-and-rename protocol.
///
/// # Errors
///
/// Returns `StoreError::Snapshot` if the file cannot be written.
pub fn write_snapshot_file(path: &Path, snapshot: &Snapshot) -> Result<(), StoreError> {
    SnapshotWriter::new(path.to_path_buf())?.write(snapshot)
}
