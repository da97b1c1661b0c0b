//! Structured error types for the document model.
//!
//! Follows the same shape as this codebase's other structured error enums: a
//! `#[non_exhaustive]` [`thiserror::Error`] with named-field context, a family of
//! `is_*` predicate methods for ergonomic matching, and `Result` aliased at the
//! crate root so callers rarely need to spell out `Error` explicitly.

use thiserror::Error;

/// Errors produced while parsing or converting values held by the document model.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// A document or JSON value could not be coerced to the field's declared type.
    #[error("type mismatch: expected {expected}, found {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// A structural expectation was violated (e.g. a non-base-10 map key, or a
    /// sub-document expected where a scalar was found).
    #[error("parse failure: {reason}")]
    ParseFailure { reason: String },

    /// A path operation was asked to resolve an invalid segment.
    #[error("invalid path segment: {segment}")]
    InvalidSegment { segment: String },
}

/// Result type used throughout this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Constructs a [`Error::TypeMismatch`] with the expected/actual type names.
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Error::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Constructs a [`Error::ParseFailure`] with a human-readable reason.
    pub fn parse_failure(reason: impl Into<String>) -> Self {
        Error::ParseFailure {
            reason: reason.into(),
        }
    }

    /// True if this error is a type mismatch.
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Error::TypeMismatch { .. })
    }

    /// True if this error is a structural parse failure.
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, Error::ParseFailure { .. })
    }
}
