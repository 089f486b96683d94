//! # DomainError
//!
//! Failures shared by every port and service. The API layer decides how
//! much of each message the caller gets to see.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed identifier, name or timestamp coming from a caller.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found (e.g., an image blob)
    #[error("{0} not found")]
    NotFound(String),

    /// Infrastructure failure (database, filesystem)
    #[error("backend error: {0}")]
    Backend(String),
}

impl DomainError {
    /// Wraps an infrastructure error with a short description of what failed.
    pub fn backend(context: &str, err: impl std::fmt::Display) -> Self {
        Self::Backend(format!("{context}: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;
