//! Error types for state-space navigation

use kripke_animator::AnimatorError;
use thiserror::Error;

/// Result type alias for state-space operations
pub type SpaceResult<T> = std::result::Result<T, SpaceError>;

/// Errors raised by exploring and navigating the state space
#[derive(Debug, Error)]
pub enum SpaceError {
    /// The state id was never inserted as a graph vertex.
    ///
    /// Distinct from a known-but-unexplored state, which is not an error.
    #[error("unknown state id: {0}")]
    UnknownState(String),

    /// The operation is not an outgoing edge of the state it was fired in
    #[error("operation {op_id} is not enabled in state {state_id}")]
    DisabledOperation { op_id: String, state_id: String },

    /// A predicate search came back empty where one solution was required
    #[error("no transition named '{name}' satisfies the predicate in state {state_id}")]
    NoMatchingOperation { name: String, state_id: String },

    /// A round trip with the engine failed; never swallowed
    #[error(transparent)]
    Animator(#[from] AnimatorError),
}
