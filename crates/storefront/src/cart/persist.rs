//! Cart snapshot persistence.
//!
//! The snapshot is a JSON array of `{pid, quantity}` objects in a single
//! file, the client-side analog of the browser's local storage key. It is
//! read once at page load (overwriting the in-memory cart) and written after
//! every successful cart render. Last writer wins; there is no merging.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::{CartEntry, CartStore};

/// Errors reading or writing the cart snapshot.
#[derive(Debug, thiserror::Error)]
pub enum CartStorageError {
    #[error("failed to read cart snapshot {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write cart snapshot {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cart snapshot {path} is not valid JSON: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Cart snapshot file.
#[derive(Debug, Clone)]
pub struct CartFile {
    path: PathBuf,
}

impl CartFile {
    /// Create a handle for the snapshot at `path`. The file need not exist.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The snapshot path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hydrate a cart from the snapshot.
    ///
    /// A missing file yields an empty cart; this is the first visit, not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<CartStore, CartStorageError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No cart snapshot, starting empty");
                return Ok(CartStore::new());
            }
            Err(source) => {
                return Err(CartStorageError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let entries: Vec<CartEntry> =
            serde_json::from_str(&raw).map_err(|source| CartStorageError::Malformed {
                path: self.path.clone(),
                source,
            })?;

        Ok(CartStore::from_entries(entries))
    }

    /// Write the cart as the new snapshot, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, store: &CartStore) -> Result<(), CartStorageError> {
        let json =
            serde_json::to_string(store.entries()).map_err(|source| CartStorageError::Malformed {
                path: self.path.clone(),
                source,
            })?;

        std::fs::write(&self.path, json).map_err(|source| CartStorageError::Write {
            path: self.path.clone(),
            source,
        })?;

        debug!(path = %self.path.display(), entries = store.len(), "Cart snapshot written");
        Ok(())
    }
}
