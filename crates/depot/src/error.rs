//! Error types for the storage facade.

use depot_core::{Digest, ValidationError};
use depot_store::StoreError;
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Key has never been written.
    #[error("key not found: {0}")]
    NotFound(String),

    /// Attachment digest is unknown.
    #[error("attachment not found: {0}")]
    AttachmentNotFound(Digest),

    /// Malformed write payload. Raised before any mutation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The backing medium failed. Not retried here.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[source] StoreError),
}

/// Coarse classification of [`Error`] for callers that only need to branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    StorageUnavailable,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound(_) | Error::AttachmentNotFound(_) => ErrorKind::NotFound,
            Error::Validation(_) => ErrorKind::Validation,
            Error::StorageUnavailable(_) => ErrorKind::StorageUnavailable,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(key) => Error::NotFound(key),
            StoreError::BlobNotFound(digest) => Error::AttachmentNotFound(digest),
            other => Error::StorageUnavailable(other),
        }
    }
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_are_classified() {
        let e: Error = StoreError::NotFound("x".into()).into();
        assert!(matches!(e, Error::NotFound(ref k) if k == "x"));
        assert_eq!(e.kind(), ErrorKind::NotFound);

        let e: Error = StoreError::BlobNotFound(Digest::of(b"a")).into();
        assert!(e.is_not_found());

        let e: Error = StoreError::Migration("boom".into()).into();
        assert_eq!(e.kind(), ErrorKind::StorageUnavailable);
    }

    #[test]
    fn test_validation_kind() {
        let e: Error = ValidationError::EmptyKey.into();
        assert_eq!(e.kind(), ErrorKind::Validation);
        assert_eq!(e.to_string(), "validation error: key must not be empty");
    }
}
