//! State exploration: the engine's full answer about one state

use crate::command::{decode_bool, decode_valuation, field_text, Command};
use crate::error::CommandError;
use crate::op::Operation;
use indexmap::IndexMap;
use kripke_term::{resolve, BindingLookup, TermOutput};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

const OPS: &str = "Ops";
const VARS: &str = "Vars";
const INVARIANT_OK: &str = "InvOk";
const TIMEOUT_OCCURRED: &str = "TimeoutOccurred";
const TIMED_OUT_OPS: &str = "TimeoutOps";

/// Everything an exploration reveals about a state besides its transitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateProperties {
    /// Variable valuation in the engine's presentation order
    pub values: IndexMap<String, String>,
    /// Whether the invariant holds in this state
    pub invariant_ok: bool,
    /// Whether a timeout occurred while computing this state's answer
    pub timeout_occurred: bool,
    /// Names of operations whose individual enablement check timed out
    pub timed_out_operations: BTreeSet<String>,
}

/// Query a state's enabled operations, valuation, invariant status, and
/// timeout flags in one round trip.
///
/// Request: `explore_state(StateId, Ops, Vars, InvOk, TimeoutOccurred,
/// TimeoutOps)`. The engine binds `Ops` to a list of operation 5-tuples,
/// `Vars` to a `binding/3` valuation list, the two flags to boolean atoms,
/// and `TimeoutOps` to a list of event names.
#[derive(Debug)]
pub struct ExploreStateCommand {
    state_id: String,
    operations: Option<Vec<Operation>>,
    properties: Option<StateProperties>,
}

impl ExploreStateCommand {
    pub fn new(state_id: impl Into<String>) -> Self {
        Self {
            state_id: state_id.into(),
            operations: None,
            properties: None,
        }
    }

    /// The state this command explores
    pub fn state_id(&self) -> &str {
        &self.state_id
    }

    /// The enabled operations, once the response has been processed
    pub fn operations(&self) -> Option<&[Operation]> {
        self.operations.as_deref()
    }

    /// The state's properties, once the response has been processed
    pub fn properties(&self) -> Option<&StateProperties> {
        self.properties.as_ref()
    }

    /// Take both results out of the command
    pub fn into_results(self) -> Option<(Vec<Operation>, StateProperties)> {
        Some((self.operations?, self.properties?))
    }
}

impl Command for ExploreStateCommand {
    fn write_request(&self, out: &mut dyn TermOutput) {
        out.open_term("explore_state");
        out.print_atom_or_number(&self.state_id);
        out.print_variable(OPS);
        out.print_variable(VARS);
        out.print_variable(INVARIANT_OK);
        out.print_variable(TIMEOUT_OCCURRED);
        out.print_variable(TIMED_OUT_OPS);
        out.close_term();
        out.fullstop();
    }

    fn process_response(&mut self, bindings: &dyn BindingLookup) -> Result<(), CommandError> {
        let mut operations = Vec::new();
        for term in resolve(bindings, OPS)?.expect_list()? {
            operations.push(Operation::from_term(term)?);
        }

        let values = decode_valuation(resolve(bindings, VARS)?)?;
        let invariant_ok = decode_bool(resolve(bindings, INVARIANT_OK)?)?;
        let timeout_occurred = decode_bool(resolve(bindings, TIMEOUT_OCCURRED)?)?;

        let mut timed_out_operations = BTreeSet::new();
        for term in resolve(bindings, TIMED_OUT_OPS)?.expect_list()? {
            timed_out_operations.insert(field_text(term, "timed-out operation name")?);
        }

        debug!(
            state = %self.state_id,
            operations = operations.len(),
            invariant_ok,
            timeout_occurred,
            "explored state"
        );

        self.operations = Some(operations);
        self.properties = Some(StateProperties {
            values,
            invariant_ok,
            timeout_occurred,
            timed_out_operations,
        });
        Ok(())
    }
}
