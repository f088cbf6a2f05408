//! File content access for the change applier.
//!
//! A store hands a mutation the latest committed text of a document and commits the result as
//! one write. The filesystem store writes to a temporary file beside the document and renames
//! it over the original, so a failed write leaves the document as it was.

use crate::error::Result;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Read and atomically rewrite whole documents.
pub trait DocumentStore {
    /// Current text of the document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read.
    fn read(&self, path: &Path) -> Result<String>;

    /// Run `mutate` on the latest text and commit what it returns.
    ///
    /// Nothing is written when `mutate` fails or returns the text unchanged. Returns the
    /// committed text.
    ///
    /// # Errors
    ///
    /// Returns the mutation's error, or an error if reading or writing fails.
    fn process<F>(&self, path: &Path, mutate: F) -> Result<String>
    where
        F: FnOnce(&str) -> Result<String>;
}

#[derive(Clone, Copy, Debug, Default)]
/// Documents on the local filesystem.
pub struct FsStore;

impl DocumentStore for FsStore {
    fn read(&self, path: &Path) -> Result<String> {
        Ok(fs::read_to_string(path)?)
    }

    fn process<F>(&self, path: &Path, mutate: F) -> Result<String>
    where
        F: FnOnce(&str) -> Result<String>,
    {
        let current = fs::read_to_string(path)?;
        let updated = mutate(&current)?;
        if updated == current {
            return Ok(updated);
        }

        let dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(updated.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| e.error)?;
        tracing::debug!(path = %path.display(), bytes = updated.len(), "document written");
        Ok(updated)
    }
}

#[cfg(test)]
#[path = "tests/store.rs"]
mod tests;
