//! Read-only access to a response's variable bindings
//!
//! The transport resolves the variables a request declared and hands the
//! result to each command as a [`BindingLookup`]. Bindings live for one
//! request/response cycle and are never mutated by consumers.

use crate::error::BindingError;
use crate::term::Term;
use std::collections::HashMap;

/// Read-only variable-name to term mapping
pub trait BindingLookup {
    /// The term bound to `name`, if the response bound it
    fn lookup(&self, name: &str) -> Option<&Term>;
}

impl BindingLookup for HashMap<String, Term> {
    fn lookup(&self, name: &str) -> Option<&Term> {
        self.get(name)
    }
}

/// An owned binding set, as a transport or test double would assemble it
#[derive(Debug, Clone, Default)]
pub struct Bindings(HashMap<String, Term>);

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding, builder-style
    pub fn bind(mut self, name: impl Into<String>, term: Term) -> Self {
        self.0.insert(name.into(), term);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, term: Term) {
        self.0.insert(name.into(), term);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl BindingLookup for Bindings {
    fn lookup(&self, name: &str) -> Option<&Term> {
        self.0.get(name)
    }
}

impl FromIterator<(String, Term)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (String, Term)>>(iter: I) -> Self {
        Bindings(iter.into_iter().collect())
    }
}

/// Resolve a variable, failing if the response did not bind it
pub fn resolve<'a>(
    bindings: &'a dyn BindingLookup,
    name: &str,
) -> Result<&'a Term, BindingError> {
    bindings
        .lookup(name)
        .ok_or_else(|| BindingError(name.to_string()))
}
