//! Engine-side boolean facts about a state

use crate::command::{decode_bool, Command};
use crate::error::CommandError;
use kripke_term::{resolve, BindingLookup, TermOutput};

const RESULT: &str = "Result";

/// Ask the engine whether a named boolean property holds at a state.
///
/// Request: `check_boolean_property(Property, StateId, Result)`; the
/// response binds `Result` to `true` or `false`. Specific properties get
/// thin wrappers (see [`CheckInitialisationStatusCommand`]).
#[derive(Debug)]
pub struct CheckBooleanPropertyCommand {
    property: String,
    state_id: String,
    result: Option<bool>,
}

impl CheckBooleanPropertyCommand {
    pub fn new(property: impl Into<String>, state_id: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            state_id: state_id.into(),
            result: None,
        }
    }

    /// The checked property name
    pub fn property(&self) -> &str {
        &self.property
    }

    /// The answer, once the response has been processed
    pub fn result(&self) -> Option<bool> {
        self.result
    }
}

impl Command for CheckBooleanPropertyCommand {
    fn write_request(&self, out: &mut dyn TermOutput) {
        out.open_term("check_boolean_property");
        out.print_atom(&self.property);
        out.print_atom_or_number(&self.state_id);
        out.print_variable(RESULT);
        out.close_term();
        out.fullstop();
    }

    fn process_response(&mut self, bindings: &dyn BindingLookup) -> Result<(), CommandError> {
        self.result = Some(decode_bool(resolve(bindings, RESULT)?)?);
        Ok(())
    }
}

/// Whether a state is fully initialised (constants set up, initialisation
/// event executed)
#[derive(Debug)]
pub struct CheckInitialisationStatusCommand(CheckBooleanPropertyCommand);

impl CheckInitialisationStatusCommand {
    pub fn new(state_id: impl Into<String>) -> Self {
        Self(CheckBooleanPropertyCommand::new(
            "initialised_state",
            state_id,
        ))
    }

    pub fn is_initialised(&self) -> Option<bool> {
        self.0.result()
    }
}

impl Command for CheckInitialisationStatusCommand {
    fn write_request(&self, out: &mut dyn TermOutput) {
        self.0.write_request(out);
    }

    fn process_response(&mut self, bindings: &dyn BindingLookup) -> Result<(), CommandError> {
        self.0.process_response(bindings)
    }
}
