//! Standalone valuation query for one state

use crate::command::{decode_valuation, Command};
use crate::error::CommandError;
use indexmap::IndexMap;
use kripke_term::{resolve, BindingLookup, TermOutput};

const BINDINGS: &str = "Bindings";

/// Fetch a state's variable valuation without a full exploration.
///
/// Request: `get_state_values(StateId, Bindings)`; the engine binds
/// `Bindings` to a `binding(Name, _, Value)` list.
#[derive(Debug)]
pub struct GetStateValuesCommand {
    state_id: String,
    values: Option<IndexMap<String, String>>,
}

impl GetStateValuesCommand {
    pub fn new(state_id: impl Into<String>) -> Self {
        Self {
            state_id: state_id.into(),
            values: None,
        }
    }

    /// The valuation, once the response has been processed
    pub fn values(&self) -> Option<&IndexMap<String, String>> {
        self.values.as_ref()
    }

    /// Take the valuation out of the command
    pub fn into_values(self) -> Option<IndexMap<String, String>> {
        self.values
    }
}

impl Command for GetStateValuesCommand {
    fn write_request(&self, out: &mut dyn TermOutput) {
        out.open_term("get_state_values");
        out.print_atom_or_number(&self.state_id);
        out.print_variable(BINDINGS);
        out.close_term();
        out.fullstop();
    }

    fn process_response(&mut self, bindings: &dyn BindingLookup) -> Result<(), CommandError> {
        self.values = Some(decode_valuation(resolve(bindings, BINDINGS)?)?);
        Ok(())
    }
}
