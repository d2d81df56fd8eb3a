//! Batching independent commands into one round trip
//!
//! The engine connection is a serialized resource, so unrelated work pays
//! one round-trip latency each unless batched. [`ComposedCommand`] writes
//! any number of member commands in one pass and demultiplexes the shared
//! response back to them, mechanically renaming each member's variables
//! with a unique prefix so the shared binding map cannot collide.

use crate::command::Command;
use crate::error::CommandError;
use kripke_term::{BindingLookup, Term, TermOutput};
use num_bigint::BigInt;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// An ordered batch of commands executed as a single request/response.
///
/// Members are borrowed mutably for the lifetime of the batch; once it is
/// dropped, each member's results are read off the member itself, which
/// never learns it was composed.
pub struct ComposedCommand<'a> {
    commands: Vec<&'a mut dyn Command>,
}

impl<'a> ComposedCommand<'a> {
    pub fn new(commands: Vec<&'a mut dyn Command>) -> Self {
        Self { commands }
    }

    /// Append another member to the batch
    pub fn push(&mut self, command: &'a mut dyn Command) {
        self.commands.push(command);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// The variable prefix assigned to the member at `index`.
    ///
    /// Indices 0..26 map to the single letters `A`..`Z`; from there the
    /// scheme appends a decimal suffix, `A0`..`Z0`, `A1`..`Z1`, and so on.
    /// The mapping is deterministic and injective for arbitrarily many
    /// commands.
    pub fn prefix(index: usize) -> String {
        if index < ALPHABET.len() {
            (ALPHABET[index] as char).to_string()
        } else {
            let n = index - ALPHABET.len();
            format!("{}{}", ALPHABET[n % ALPHABET.len()] as char, n / ALPHABET.len())
        }
    }

    /// Re-run one member's `process_response` against a fresh binding set,
    /// using the prefix it was assigned when the batch was written.
    ///
    /// Fails with [`CommandError::NotComposed`] for an index outside the
    /// batch.
    pub fn reprocess(
        &mut self,
        index: usize,
        bindings: &dyn BindingLookup,
    ) -> Result<(), CommandError> {
        if index >= self.commands.len() {
            return Err(CommandError::NotComposed {
                index,
                count: self.commands.len(),
            });
        }
        let prefix = Self::prefix(index);
        let view = PrefixedBindings {
            inner: bindings,
            prefix: &prefix,
        };
        self.commands[index].process_response(&view)
    }
}

impl Command for ComposedCommand<'_> {
    fn write_request(&self, out: &mut dyn TermOutput) {
        for (index, command) in self.commands.iter().enumerate() {
            let prefix = Self::prefix(index);
            let mut prefixed = PrefixingOutput {
                inner: out,
                prefix: &prefix,
            };
            command.write_request(&mut prefixed);
        }
        // members' own fullstops were suppressed; terminate the batch once
        out.fullstop();
    }

    fn process_response(&mut self, bindings: &dyn BindingLookup) -> Result<(), CommandError> {
        for (index, command) in self.commands.iter_mut().enumerate() {
            let prefix = Self::prefix(index);
            let view = PrefixedBindings {
                inner: bindings,
                prefix: &prefix,
            };
            command.process_response(&view)?;
        }
        Ok(())
    }
}

/// Writer wrapper that renames variables and swallows member fullstops
struct PrefixingOutput<'b> {
    inner: &'b mut dyn TermOutput,
    prefix: &'b str,
}

impl TermOutput for PrefixingOutput<'_> {
    fn open_term(&mut self, functor: &str) {
        self.inner.open_term(functor);
    }

    fn print_atom(&mut self, content: &str) {
        self.inner.print_atom(content);
    }

    fn print_number(&mut self, value: i64) {
        self.inner.print_number(value);
    }

    fn print_bignum(&mut self, value: &BigInt) {
        self.inner.print_bignum(value);
    }

    fn print_atom_or_number(&mut self, content: &str) {
        self.inner.print_atom_or_number(content);
    }

    fn print_variable(&mut self, name: &str) {
        self.inner.print_variable(&format!("{}{}", self.prefix, name));
    }

    fn open_list(&mut self) {
        self.inner.open_list();
    }

    fn close_list(&mut self) {
        self.inner.close_list();
    }

    fn close_term(&mut self) {
        self.inner.close_term();
    }

    fn fullstop(&mut self) {
        // only the composer terminates the batch
    }
}

/// Binding view that redirects every lookup through the member's prefix
struct PrefixedBindings<'b> {
    inner: &'b dyn BindingLookup,
    prefix: &'b str,
}

impl BindingLookup for PrefixedBindings<'_> {
    fn lookup(&self, name: &str) -> Option<&Term> {
        self.inner.lookup(&format!("{}{}", self.prefix, name))
    }
}
