//! Domain error model.

use thiserror::Error;

use crate::id::BookId;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is recoverable: the failing operation aborts and the
/// in-memory catalog is left as it was before the call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A field failed validation (blank text, negative quantity, bad price).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A book with this id already exists.
    #[error("a book with id {0} already exists")]
    Duplicate(BookId),

    /// No book with this id is known.
    #[error("no book with id {0}")]
    NotFound(BookId),

    /// The persistence gateway refused or failed the operation.
    #[error("store error: {0}")]
    Store(String),

    /// Persisted data does not satisfy the record rules.
    #[error("corrupted persisted state: {0}")]
    Corrupted(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn corrupted(msg: impl Into<String>) -> Self {
        Self::Corrupted(msg.into())
    }

    /// True for failures caused by bad caller input rather than the store.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
