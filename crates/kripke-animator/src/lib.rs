//! kripke-animator - command protocol layer for the external engine
//!
//! Every interaction with the engine is a *command*: one struct per unit of
//! work, holding its own inputs and, after the round trip, its own typed
//! results. Commands implement the two-method [`Command`] contract —
//! write the request fragment, decode the response bindings — and are
//! executed through the [`Animator`] transport seam.
//!
//! # Commands
//!
//! - [`ExploreStateCommand`]: a state's enabled operations, valuation,
//!   invariant and timeout status
//! - [`GetOperationByPredicateCommand`]: synthesize transitions matching an
//!   event name and guard predicate
//! - [`GetStateValuesCommand`]: a state's variable valuation alone
//! - [`EvaluateFormulasCommand`]: evaluate user formulas at a state
//! - [`CheckBooleanPropertyCommand`] / [`CheckInitialisationStatusCommand`]:
//!   engine-side boolean facts about a state
//! - [`SetPreferenceCommand`], [`StartAnimationCommand`],
//!   [`ClearMachineCommand`], [`LoadModelCommand`]: session control
//!
//! [`ComposedCommand`] batches independent commands into a single round
//! trip, rewriting each member's variables with a unique prefix so the
//! shared binding map cannot collide; [`run_load_sequence`] is the composed
//! clear/configure/load/start/explore handshake a fresh session performs.
//!
//! The protocol has no request multiplexing: responses match requests by
//! arrival order, so each [`Animator`] must serialize its round trips.

mod boolean;
mod command;
mod composed;
mod control;
mod error;
mod explore;
mod formulas;
mod op;
mod predicate;
mod state_values;

pub use boolean::{CheckBooleanPropertyCommand, CheckInitialisationStatusCommand};
pub use command::{Animator, Command};
pub use composed::ComposedCommand;
pub use control::{
    run_load_sequence, ClearMachineCommand, LoadModelCommand, SetPreferenceCommand,
    StartAnimationCommand,
};
pub use error::{AnimatorError, AnimatorResult, CommandError};
pub use explore::{ExploreStateCommand, StateProperties};
pub use formulas::EvaluateFormulasCommand;
pub use op::{OpParameter, Operation};
pub use predicate::GetOperationByPredicateCommand;
pub use state_values::GetStateValuesCommand;

/// The engine-assigned identifier of the distinguished initial state
pub const ROOT_STATE_ID: &str = "root";
