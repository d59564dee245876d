use crate::{CoreError, Result};
use fs2::FileExt;
use std::path::{Path, PathBuf};

/// Exclusive advisory lock guarding read-modify-write cycles on a source
/// document. Nothing in the pipeline serializes writers otherwise, so every
/// live edit of a document takes this lock first; it is released on drop.
pub struct SourceLock {
    #[allow(dead_code)]
    file: std::fs::File,
    path: PathBuf,
}

impl SourceLock {
    /// Acquire the lock for `source`, blocking until it is free. The lock
    /// lives in a sibling `.{name}.lock` file so the document itself stays
    /// untouched.
    pub fn acquire(source: &Path) -> Result<Self> {
        let path = Self::lock_path(source);
        let file = std::fs::OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|err| CoreError::LockError(format!("open {}: {err}", path.display())))?;

        file.lock_exclusive()
            .map_err(|err| CoreError::LockError(format!("acquire {}: {err}", path.display())))?;

        Ok(Self { file, path })
    }

    #[must_use]
    pub fn lock_path(source: &Path) -> PathBuf {
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "source".to_string());
        source.with_file_name(format!(".{name}.lock"))
    }
}

impl Drop for SourceLock {
    fn drop(&mut self) {
        if let Err(err) = fs2::FileExt::unlock(&self.file) {
            log::warn!("Failed to unlock {}: {err}", self.path.display());
        }
    }
}
