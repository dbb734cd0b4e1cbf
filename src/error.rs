//! Error taxonomy shared by the store, the update service and the jobs.

use std::io;
use std::path::PathBuf;

use crate::notify::NotifyError;
use crate::store::StoredVersion;

/// Errors that can occur while reading, mutating or reporting on the inventory.
#[derive(Debug)]
pub enum InventoryError {
    /// Persisted data could not be parsed or has an unexpected shape.
    MalformedDocument(PathBuf, String),
    /// Caller-supplied data failed validation.
    InvalidPayload(String),
    /// No ingredient with the given name exists in any category.
    ItemNotFound(String),
    /// I/O error reading or writing a persisted file.
    StoreIo(PathBuf, io::Error),
    /// The caller's base version no longer matches the document on disk.
    StaleVersion {
        expected: StoredVersion,
        actual: StoredVersion,
    },
    /// Outbound notification failed.
    Notification(NotifyError),
}

impl InventoryError {
    /// Returns true for errors caused by the caller rather than the system.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            InventoryError::InvalidPayload(_)
                | InventoryError::ItemNotFound(_)
                | InventoryError::StaleVersion { .. }
        )
    }
}

impl std::fmt::Display for InventoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InventoryError::MalformedDocument(path, reason) => {
                write!(f, "Malformed document {}: {}", path.display(), reason)
            }
            InventoryError::InvalidPayload(reason) => write!(f, "Invalid payload: {}", reason),
            InventoryError::ItemNotFound(name) => write!(f, "Item not found: {}", name),
            InventoryError::StoreIo(path, e) => {
                write!(f, "I/O error for {}: {}", path.display(), e)
            }
            InventoryError::StaleVersion { expected, actual } => write!(
                f,
                "Document changed since version {} (current version is {})",
                expected, actual
            ),
            InventoryError::Notification(e) => write!(f, "Notification failed: {}", e),
        }
    }
}

impl std::error::Error for InventoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InventoryError::StoreIo(_, e) => Some(e),
            InventoryError::Notification(e) => Some(e),
            _ => None,
        }
    }
}

impl From<NotifyError> for InventoryError {
    fn from(e: NotifyError) -> Self {
        InventoryError::Notification(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_errors() {
        assert!(InventoryError::InvalidPayload("x".into()).is_caller_error());
        assert!(InventoryError::ItemNotFound("Garlic".into()).is_caller_error());
        assert!(!InventoryError::MalformedDocument(PathBuf::from("data.json"), "x".into())
            .is_caller_error());
        assert!(!InventoryError::StoreIo(
            PathBuf::from("data.json"),
            io::Error::new(io::ErrorKind::Other, "disk full")
        )
        .is_caller_error());
    }

    #[test]
    fn test_error_display() {
        let err = InventoryError::ItemNotFound("Garlic".to_string());
        assert_eq!(err.to_string(), "Item not found: Garlic");

        let err = InventoryError::MalformedDocument(PathBuf::from("data.json"), "bad".into());
        assert!(err.to_string().contains("data.json"));
    }
}
