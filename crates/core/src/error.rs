//! Errors raised by client-side rules, before or instead of a backend call.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// A rule the admin client enforces itself.
///
/// The message is written for the person at the keyboard and is shown
/// verbatim next to the form or action that failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Form input that must not be submitted as-is.
    #[error("{0}")]
    Validation(String),

    /// An action the record's current state does not allow.
    #[error("{0}")]
    InvariantViolation(String),

    /// Text that should have been an identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// The inline message, without any prefix.
    pub fn message(&self) -> &str {
        match self {
            DomainError::Validation(msg) | DomainError::InvariantViolation(msg) | DomainError::InvalidId(msg) => msg,
        }
    }
}
