//! Atomic JSON file handling.
//!
//! Every store keeps its whole record set in one JSON document. A
//! [`JsonFile`] reads that document on open and replaces it atomically on
//! save, so a crash mid-write leaves either the old or the new content.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{PersistenceError, Result};

/// A JSON document on disk that is always replaced as a whole.
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    /// Creates a handle for the document at `path`. Nothing is touched on disk.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the document, or returns `T::default()` if the file does not exist yet.
    pub fn load_or_default<T: DeserializeOwned + Default>(&self) -> Result<T> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no existing file, starting empty");
            return Ok(T::default());
        }
        let data = fs::read_to_string(&self.path).map_err(|source| PersistenceError::ReadError {
            path: self.path.clone(),
            source,
        })?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Serializes `value` and atomically replaces the file with it.
    pub fn save<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let json = serde_json::to_vec_pretty(value)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|source| PersistenceError::DirectoryError {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let write_err = |source| PersistenceError::WriteError {
            path: self.path.clone(),
            source,
        };

        // Temp file must live on the same filesystem for rename to be atomic
        let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        temp.write_all(&json).map_err(write_err)?;
        temp.as_file().sync_all().map_err(write_err)?;
        temp.persist(&self.path).map_err(|e| write_err(e.error))?;

        debug!(path = %self.path.display(), bytes = json.len(), "saved file");
        Ok(())
    }
}
