//! Error types for the command protocol layer

use kripke_term::{BindingError, TermError};
use thiserror::Error;

/// Result type alias for animator executions
pub type AnimatorResult<T> = std::result::Result<T, AnimatorError>;

/// Errors raised while decoding a command's response.
///
/// A response that does not match the shape the command wrote for is a
/// protocol contract violation; it aborts the command and propagates, it is
/// never silently repaired.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The response was structurally valid but not what the command expects
    #[error("unexpected response shape: {0}")]
    Protocol(String),

    /// A variable the command introduced was not bound by the response
    #[error("missing binding: {0}")]
    Unbound(#[from] BindingError),

    /// A bound term did not have the asserted functor/arity/shape
    #[error("malformed term in response: {0}")]
    Malformed(#[from] TermError),

    /// Reprocessing was requested for a command outside the composed set
    #[error("cannot reprocess command at index {index}: only {count} commands composed")]
    NotComposed { index: usize, count: usize },
}

/// Errors raised by executing a command against the engine
#[derive(Debug, Error)]
pub enum AnimatorError {
    /// The round trip completed but the response could not be decoded
    #[error(transparent)]
    Command(#[from] CommandError),

    /// The transport failed to complete the round trip; always propagated
    #[error("engine transport failure: {0}")]
    Transport(String),
}
