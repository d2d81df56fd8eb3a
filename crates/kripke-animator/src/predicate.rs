//! Predicate-driven transition search
//!
//! When the transition space at a state is too large to enumerate eagerly,
//! the engine can be asked to synthesize up to a requested number of
//! enabled transitions for one event name under an extra guard predicate.

use crate::command::Command;
use crate::error::CommandError;
use crate::op::Operation;
use kripke_term::{resolve, write_term, BindingLookup, Term, TermOutput};
use tracing::debug;

const OPS: &str = "Ops";
const ERRORS: &str = "Errors";

/// Find enabled transitions named `name` at a state whose parameters
/// satisfy `predicate`, capped at `max_solutions`.
///
/// Request: `execute_custom_operations(StateId, Name, Predicate, Max, Ops,
/// Errors)`. The response binds `Ops` to the same operation 5-tuple list an
/// exploration produces and `Errors` to a list of engine-side complaints,
/// which must be empty.
#[derive(Debug)]
pub struct GetOperationByPredicateCommand {
    state_id: String,
    name: String,
    predicate: Term,
    max_solutions: usize,
    operations: Option<Vec<Operation>>,
}

impl GetOperationByPredicateCommand {
    pub fn new(
        state_id: impl Into<String>,
        name: impl Into<String>,
        predicate: Term,
        max_solutions: usize,
    ) -> Self {
        Self {
            state_id: state_id.into(),
            name: name.into(),
            predicate,
            max_solutions,
            operations: None,
        }
    }

    /// The discovered operations, once the response has been processed
    pub fn operations(&self) -> Option<&[Operation]> {
        self.operations.as_deref()
    }

    /// Take the discovered operations out of the command
    pub fn into_operations(self) -> Option<Vec<Operation>> {
        self.operations
    }
}

impl Command for GetOperationByPredicateCommand {
    fn write_request(&self, out: &mut dyn TermOutput) {
        out.open_term("execute_custom_operations");
        out.print_atom_or_number(&self.state_id);
        out.print_atom(&self.name);
        write_term(out, &self.predicate);
        out.print_number(self.max_solutions as i64);
        out.print_variable(OPS);
        out.print_variable(ERRORS);
        out.close_term();
        out.fullstop();
    }

    fn process_response(&mut self, bindings: &dyn BindingLookup) -> Result<(), CommandError> {
        let errors = resolve(bindings, ERRORS)?.expect_list()?;
        if !errors.is_empty() {
            let rendered: Vec<String> = errors.iter().map(|t| t.to_string()).collect();
            return Err(CommandError::Protocol(format!(
                "predicate search for '{}' failed: {}",
                self.name,
                rendered.join("; ")
            )));
        }

        let mut operations = Vec::new();
        for term in resolve(bindings, OPS)?.expect_list()? {
            operations.push(Operation::from_term(term)?);
        }
        debug!(
            state = %self.state_id,
            name = %self.name,
            found = operations.len(),
            "predicate search completed"
        );
        self.operations = Some(operations);
        Ok(())
    }
}
