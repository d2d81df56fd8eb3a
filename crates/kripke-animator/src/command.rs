//! The unit-of-work contract and the transport seam

use crate::error::{AnimatorError, CommandError};
use kripke_term::{BindingLookup, Term, TermOutput};

/// One unit of work against the engine.
///
/// A command serves exactly one request/response cycle: `write_request`
/// emits its fragment of the outgoing term stream, introducing whatever
/// variables it needs the engine to fill in, and `process_response` reads
/// those variables back and populates the command's own result fields.
/// Until `process_response` runs, results are absent ("not yet computed"),
/// which is distinct from computed-but-empty. Reusing an instance for a
/// second cycle is undefined.
pub trait Command {
    /// Emit this command's request fragment
    fn write_request(&self, out: &mut dyn TermOutput);

    /// Decode this command's variables from the response bindings.
    ///
    /// May mutate only the command's own result fields, never shared state.
    fn process_response(&mut self, bindings: &dyn BindingLookup) -> Result<(), CommandError>;
}

/// The engine transport.
///
/// An implementation serializes the command's request, performs one
/// blocking exchange with the engine process, resolves the declared
/// variables, and hands them back to the command. The binding map lives
/// only for the duration of `execute`. At most one round trip may be in
/// flight per animator; the protocol matches responses to requests purely
/// by arrival order.
pub trait Animator {
    fn execute(&mut self, command: &mut dyn Command) -> Result<(), AnimatorError>;
}

/// Decode an engine boolean (the atom `true` or `false`)
pub(crate) fn decode_bool(term: &Term) -> Result<bool, CommandError> {
    match term {
        Term::Atom(name) if name == "true" => Ok(true),
        Term::Atom(name) if name == "false" => Ok(false),
        other => Err(CommandError::Protocol(format!(
            "expected boolean atom, got {}",
            other
        ))),
    }
}

/// Decode an atomic field (atom, integer, or variable) to its text
pub(crate) fn field_text(term: &Term, what: &str) -> Result<String, CommandError> {
    term.atom_text()
        .ok_or_else(|| CommandError::Protocol(format!("expected atomic {}, got {}", what, term)))
}

/// Decode a valuation list of `binding(Name, _, Value)` triples,
/// preserving the engine's presentation order
pub(crate) fn decode_valuation(
    list: &Term,
) -> Result<indexmap::IndexMap<String, String>, CommandError> {
    let mut values = indexmap::IndexMap::new();
    for entry in list.expect_list()? {
        let args = entry.expect_compound("binding", 3)?;
        let name = field_text(&args[0], "variable name")?;
        let value = field_text(&args[2], "variable value")?;
        values.insert(name, value);
    }
    Ok(values)
}
