//! Error taxonomy for todo operations.

use crate::todo::TodoId;
use thiserror::Error;

/// Result type alias for todo operations.
pub type Result<T> = std::result::Result<T, TodoError>;

/// Errors produced by the persistence and validation boundary.
///
/// The HTTP layer maps these one-to-one onto status codes:
/// `Validation` → 400, `NotFound` → 404, `Storage` → 500.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TodoError {
    /// Input rejected before reaching storage (empty title, for example).
    #[error("{0}")]
    Validation(String),

    /// No record exists for the requested id.
    #[error("Todo with id {0} not found")]
    NotFound(TodoId),

    /// The storage engine failed (I/O, constraint, pool exhaustion).
    #[error("Storage error: {0}")]
    Storage(String),
}

impl TodoError {
    /// Creates a validation error from any message.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a storage error from any displayable source.
    #[must_use]
    pub fn storage(source: impl std::fmt::Display) -> Self {
        Self::Storage(source.to_string())
    }

    /// Returns `true` for [`TodoError::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns `true` for [`TodoError::Validation`].
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
