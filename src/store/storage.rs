//! The persisted inventory document.
//!
//! A single JSON file, rewritten whole on every change. Each read-modify-write
//! holds an exclusive lock on `<file>.lock` and every write goes through a
//! temp file + rename, so readers never see a half-written document.

use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::lock::{self, FileLock};
use super::schema::{self, NormalizedDocument};
use crate::error::InventoryError;

/// Content hash of the document bytes on disk, used as an ETag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoredVersion(String);

impl StoredVersion {
    const MISSING: &'static str = "none";

    pub fn of(bytes: &[u8]) -> Self {
        let hash = Sha256::digest(bytes);
        Self(format!("{:x}", hash))
    }

    /// Version reported for a document that does not exist yet.
    pub fn missing() -> Self {
        Self(Self::MISSING.to_string())
    }

    /// Parses an `If-Match` style value, with or without quotes.
    pub fn parse(s: &str) -> Self {
        Self(s.trim().trim_matches('"').to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StoredVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What an update starts from when the current document cannot be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Fail when the file is missing or unparsable.
    Fail,
    /// Start from an empty bare-list document when the file is missing.
    StartEmpty,
    /// Like `StartEmpty`, and an unparsable file is moved aside to
    /// `<file>.corrupt-<unix time>` before the new document is written.
    Replace,
}

/// File-backed inventory document.
#[derive(Debug, Clone)]
pub struct InventoryStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl InventoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock_path = lock::sidecar(&path, "lock");
        Self { path, lock_path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and normalizes the current document.
    pub fn read(&self) -> Result<(NormalizedDocument, StoredVersion), InventoryError> {
        let _lock = FileLock::shared(&self.lock_path)
            .map_err(|e| InventoryError::StoreIo(self.lock_path.clone(), e))?;

        self.load()?.ok_or_else(|| self.not_found())
    }

    /// Runs a read-modify-write cycle under the exclusive lock.
    ///
    /// `mutate` sees the normalized document and may change its categories,
    /// shape and metadata. Nothing is written if it returns an error. When
    /// `expected` is given and differs from the version on disk the update is
    /// rejected with [`InventoryError::StaleVersion`].
    pub fn update<T, F>(
        &self,
        expected: Option<&StoredVersion>,
        fallback: Fallback,
        mutate: F,
    ) -> Result<(T, StoredVersion), InventoryError>
    where
        F: FnOnce(&mut NormalizedDocument) -> Result<T, InventoryError>,
    {
        let _lock = FileLock::exclusive(&self.lock_path)
            .map_err(|e| InventoryError::StoreIo(self.lock_path.clone(), e))?;

        let mut unreadable = None;
        let (mut doc, current) = match self.read_bytes()? {
            Some(bytes) => {
                let current = StoredVersion::of(&bytes);
                match schema::normalize(&bytes) {
                    Ok(doc) => (doc, current),
                    Err(e) if fallback == Fallback::Replace => {
                        unreadable = Some(e);
                        (NormalizedDocument::empty(), current)
                    }
                    Err(e) => return Err(self.malformed(e)),
                }
            }
            None if fallback == Fallback::Fail => return Err(self.not_found()),
            None => (NormalizedDocument::empty(), StoredVersion::missing()),
        };

        if let Some(expected) = expected {
            if *expected != current {
                return Err(InventoryError::StaleVersion {
                    expected: expected.clone(),
                    actual: current,
                });
            }
        }

        let result = mutate(&mut doc)?;

        let bytes = doc.to_bytes().map_err(|e| self.malformed(e))?;

        if let Some(reason) = unreadable {
            let moved_to = lock::quarantine(&self.path)
                .map_err(|e| InventoryError::StoreIo(self.path.clone(), e))?;
            tracing::warn!(
                "Inventory {} was unreadable ({}); moved to {} before replacing it",
                self.path.display(),
                reason,
                moved_to.display()
            );
        }

        lock::write_atomic(&self.path, &bytes)
            .map_err(|e| InventoryError::StoreIo(self.path.clone(), e))?;

        Ok((result, StoredVersion::of(&bytes)))
    }

    fn load(&self) -> Result<Option<(NormalizedDocument, StoredVersion)>, InventoryError> {
        match self.read_bytes()? {
            Some(bytes) => {
                let doc = schema::normalize(&bytes).map_err(|e| self.malformed(e))?;
                Ok(Some((doc, StoredVersion::of(&bytes))))
            }
            None => Ok(None),
        }
    }

    fn read_bytes(&self) -> Result<Option<Vec<u8>>, InventoryError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(InventoryError::StoreIo(self.path.clone(), e)),
        }
    }

    fn malformed(&self, e: schema::SchemaError) -> InventoryError {
        InventoryError::MalformedDocument(self.path.clone(), e.to_string())
    }

    fn not_found(&self) -> InventoryError {
        InventoryError::StoreIo(
            self.path.clone(),
            io::Error::new(io::ErrorKind::NotFound, "inventory document does not exist"),
        )
    }
}
