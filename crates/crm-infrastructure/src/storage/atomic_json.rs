//! Atomic JSON file operations.
//!
//! Writes go to a temporary sibling file which is fsynced and renamed over
//! the target, so readers see either the old or the new content. Read-modify-
//! write cycles hold an exclusive lock file for their duration.

use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use crm_core::CrmError;

/// Failures of the atomic file layer, converted into [`CrmError`] at the
/// store boundary.
#[derive(Debug)]
pub enum AtomicJsonError {
    /// File I/O error.
    IoError(std::io::Error),
    /// JSON serialization/deserialization error.
    JsonError(serde_json::Error),
    /// File locking error.
    LockError(String),
}

impl std::fmt::Display for AtomicJsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AtomicJsonError::IoError(e) => write!(f, "I/O error: {}", e),
            AtomicJsonError::JsonError(e) => write!(f, "JSON error: {}", e),
            AtomicJsonError::LockError(e) => write!(f, "Lock error: {}", e),
        }
    }
}

impl std::error::Error for AtomicJsonError {}

impl From<std::io::Error> for AtomicJsonError {
    fn from(e: std::io::Error) -> Self {
        AtomicJsonError::IoError(e)
    }
}

impl From<serde_json::Error> for AtomicJsonError {
    fn from(e: serde_json::Error) -> Self {
        AtomicJsonError::JsonError(e)
    }
}

impl From<AtomicJsonError> for CrmError {
    fn from(e: AtomicJsonError) -> Self {
        match e {
            AtomicJsonError::IoError(io) => io.into(),
            AtomicJsonError::JsonError(json) => json.into(),
            AtomicJsonError::LockError(message) => CrmError::storage(message),
        }
    }
}

/// A handle to a JSON file that is only ever replaced atomically.
pub struct AtomicJsonFile<T> {
    path: PathBuf,
    _phantom: PhantomData<T>,
}

impl<T> AtomicJsonFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _phantom: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file. A missing or blank file is `Ok(None)`, not an error.
    pub fn load(&self) -> Result<Option<T>, AtomicJsonError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;

        if content.trim().is_empty() {
            return Ok(None);
        }

        let data: T = serde_json::from_str(&content)?;
        Ok(Some(data))
    }

    /// Serializes `data` and atomically replaces the file.
    pub fn save(&self, data: &T) -> Result<(), AtomicJsonError> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(data)?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(json.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }

    /// Loads the current value (or `default_value`), applies `f`, and saves
    /// the result, all under an exclusive lock.
    pub fn update<F, R>(&self, default_value: T, f: F) -> Result<R, AtomicJsonError>
    where
        F: FnOnce(&mut T) -> R,
    {
        let _lock = FileLock::acquire(&self.path)?;

        let mut data = self.load()?.unwrap_or(default_value);
        let result = f(&mut data);
        self.save(&data)?;

        Ok(result)
    }

    fn temp_path(&self) -> Result<PathBuf, AtomicJsonError> {
        let parent = self.path.parent().ok_or_else(|| {
            AtomicJsonError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Path has no parent directory",
            ))
        })?;

        let file_name = self.path.file_name().ok_or_else(|| {
            AtomicJsonError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Path has no file name",
            ))
        })?;

        Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
    }
}

/// Exclusive lock on `<path>.lock`, released on drop.
struct FileLock {
    #[allow(dead_code)]
    file: File,
    lock_path: PathBuf,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self, AtomicJsonError> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive()
                .map_err(|e| AtomicJsonError::LockError(format!("Failed to acquire lock: {}", e)))?;
        }

        Ok(FileLock { file, lock_path })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Best effort; the lock itself is released with the handle.
        let _ = fs::remove_file(&self.lock_path);
    }
}
