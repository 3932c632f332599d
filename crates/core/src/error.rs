//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type CartResult<T> = Result<T, CartError>;

/// Domain-level error.
///
/// Keep this focused on deterministic domain failures (validation, invariant
/// violations). Storage and task-lifecycle concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A cart invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl CartError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }
}
