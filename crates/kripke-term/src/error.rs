//! Error types for term access and binding resolution

use thiserror::Error;

/// Result type alias for term operations
pub type TermResult<T> = std::result::Result<T, TermError>;

/// Errors raised when a term does not have the shape a caller asserted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TermError {
    /// 1-indexed argument access past the term's arity
    #[error("argument index {index} out of range for {functor}/{arity}")]
    IndexOutOfRange {
        functor: String,
        arity: usize,
        index: usize,
    },

    /// The term is a compound, but not the functor/arity the caller expected
    #[error("expected {expected_functor}/{expected_arity}, got {actual}")]
    FunctorMismatch {
        expected_functor: String,
        expected_arity: usize,
        actual: String,
    },

    /// Argument access on a term that has no arguments
    #[error("expected a compound term, got {0}")]
    NotACompound(String),

    /// List extraction from a non-list term
    #[error("expected a list, got {0}")]
    NotAList(String),
}

/// Error raised when resolving a variable that the response did not bind
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("variable '{0}' is not bound in the response")]
pub struct BindingError(pub String);
