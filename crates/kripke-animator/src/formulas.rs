//! Formula evaluation at a state

use crate::command::{field_text, Command};
use crate::error::CommandError;
use kripke_term::{resolve, BindingLookup, TermOutput};

const VALUES: &str = "Values";

/// Evaluate raw formulas at a state.
///
/// Request: `evaluate_formulas(StateId, [Formula...], Values)`; the
/// formulas are sent as raw text atoms for the engine's own front end to
/// parse, and `Values` comes back as a list of atomic results positionally
/// paired with the submitted formulas.
#[derive(Debug)]
pub struct EvaluateFormulasCommand {
    state_id: String,
    formulas: Vec<String>,
    values: Option<Vec<String>>,
}

impl EvaluateFormulasCommand {
    pub fn new(state_id: impl Into<String>, formulas: Vec<String>) -> Self {
        Self {
            state_id: state_id.into(),
            formulas,
            values: None,
        }
    }

    /// The formulas this command submits, in wire order
    pub fn formulas(&self) -> &[String] {
        &self.formulas
    }

    /// The evaluated values, once the response has been processed
    pub fn values(&self) -> Option<&[String]> {
        self.values.as_deref()
    }

    /// Pair each formula with its evaluated value
    pub fn results(&self) -> Option<impl Iterator<Item = (&str, &str)>> {
        self.values.as_ref().map(|values| {
            self.formulas
                .iter()
                .map(String::as_str)
                .zip(values.iter().map(String::as_str))
        })
    }
}

impl Command for EvaluateFormulasCommand {
    fn write_request(&self, out: &mut dyn TermOutput) {
        out.open_term("evaluate_formulas");
        out.print_atom_or_number(&self.state_id);
        out.open_list();
        for formula in &self.formulas {
            out.print_atom(formula);
        }
        out.close_list();
        out.print_variable(VALUES);
        out.close_term();
        out.fullstop();
    }

    fn process_response(&mut self, bindings: &dyn BindingLookup) -> Result<(), CommandError> {
        let list = resolve(bindings, VALUES)?.expect_list()?;
        if list.len() != self.formulas.len() {
            return Err(CommandError::Protocol(format!(
                "engine returned {} values for {} formulas",
                list.len(),
                self.formulas.len()
            )));
        }
        let mut values = Vec::with_capacity(list.len());
        for term in list {
            values.push(field_text(term, "formula value")?);
        }
        self.values = Some(values);
        Ok(())
    }
}
