//! The protocol's structured value type
//!
//! Terms are immutable once constructed and carry no identity beyond their
//! value. Argument access is 1-indexed, matching the protocol's own
//! convention, and functor/arity pairs are the dispatch key when decoding
//! responses: an atom answers to `functor()` like a 0-arity compound does.

use crate::error::{TermError, TermResult};
use crate::output::push_atom;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A protocol term: atom, integer, variable, compound, or list
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    /// A named constant, e.g. `root` or `none`
    Atom(String),
    /// An arbitrary-precision integer
    Int(BigInt),
    /// A named variable to be bound by the engine
    Var(String),
    /// A functor applied to one or more arguments
    Compound { functor: String, args: Vec<Term> },
    /// An ordered, finite sequence of terms
    List(Vec<Term>),
}

impl Term {
    /// Build an atom term
    pub fn atom(name: impl Into<String>) -> Term {
        Term::Atom(name.into())
    }

    /// Build an integer term
    pub fn int(value: impl Into<BigInt>) -> Term {
        Term::Int(value.into())
    }

    /// Build a variable term
    pub fn var(name: impl Into<String>) -> Term {
        Term::Var(name.into())
    }

    /// Build a compound term; an empty argument list yields the atom
    pub fn compound(functor: impl Into<String>, args: Vec<Term>) -> Term {
        let functor = functor.into();
        if args.is_empty() {
            Term::Atom(functor)
        } else {
            Term::Compound { functor, args }
        }
    }

    /// Build a list term
    pub fn list(items: Vec<Term>) -> Term {
        Term::List(items)
    }

    /// The functor name of an atom or compound
    pub fn functor(&self) -> Option<&str> {
        match self {
            Term::Atom(name) => Some(name),
            Term::Compound { functor, .. } => Some(functor),
            _ => None,
        }
    }

    /// The number of arguments (0 for everything but compounds)
    pub fn arity(&self) -> usize {
        match self {
            Term::Compound { args, .. } => args.len(),
            _ => 0,
        }
    }

    /// The i-th argument, 1-indexed
    pub fn arg(&self, index: usize) -> TermResult<&Term> {
        match self {
            Term::Compound { functor, args } => {
                if index >= 1 && index <= args.len() {
                    Ok(&args[index - 1])
                } else {
                    Err(TermError::IndexOutOfRange {
                        functor: functor.clone(),
                        arity: args.len(),
                        index,
                    })
                }
            }
            other => Err(TermError::NotACompound(other.to_string())),
        }
    }

    /// Assert this term is `functor/arity` and return its arguments.
    ///
    /// An atom counts as a 0-arity compound, so
    /// `Term::atom("true").expect_compound("true", 0)` succeeds with an
    /// empty slice.
    pub fn expect_compound(&self, functor: &str, arity: usize) -> TermResult<&[Term]> {
        match self {
            Term::Atom(name) if arity == 0 && name == functor => Ok(&[]),
            Term::Compound { functor: f, args } if f == functor && args.len() == arity => Ok(args),
            other => Err(TermError::FunctorMismatch {
                expected_functor: functor.to_string(),
                expected_arity: arity,
                actual: other.to_string(),
            }),
        }
    }

    /// Assert this term is a list and return its elements
    pub fn expect_list(&self) -> TermResult<&[Term]> {
        match self {
            Term::List(items) => Ok(items),
            other => Err(TermError::NotAList(other.to_string())),
        }
    }

    /// Whether this term is the empty list
    pub fn is_empty_list(&self) -> bool {
        matches!(self, Term::List(items) if items.is_empty())
    }

    /// The textual content of an atomic term.
    ///
    /// Atoms and variables yield their name, integers their decimal form.
    /// State and operation identifiers arrive as any of the three, so this
    /// is the uniform decoder for them. Compounds and lists yield `None`.
    pub fn atom_text(&self) -> Option<String> {
        match self {
            Term::Atom(name) | Term::Var(name) => Some(name.clone()),
            Term::Int(value) => Some(value.to_string()),
            _ => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Atom(name) => {
                let mut buf = String::new();
                push_atom(&mut buf, name);
                f.write_str(&buf)
            }
            Term::Int(value) => write!(f, "{}", value),
            Term::Var(name) => f.write_str(name),
            Term::Compound { functor, args } => {
                let mut buf = String::new();
                push_atom(&mut buf, functor);
                f.write_str(&buf)?;
                f.write_str("(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
            Term::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op_term() -> Term {
        Term::compound(
            "op",
            vec![
                Term::int(1),
                Term::atom("inc"),
                Term::atom("root"),
                Term::atom("s1"),
                Term::atom("none"),
            ],
        )
    }

    #[test]
    fn arg_access_is_one_indexed() {
        let term = op_term();
        assert_eq!(term.arg(1).unwrap(), &Term::int(1));
        assert_eq!(term.arg(5).unwrap(), &Term::atom("none"));
    }

    #[test]
    fn arg_zero_and_past_arity_are_out_of_range() {
        let term = op_term();
        assert!(matches!(
            term.arg(0),
            Err(TermError::IndexOutOfRange { index: 0, arity: 5, .. })
        ));
        assert!(matches!(
            term.arg(6),
            Err(TermError::IndexOutOfRange { index: 6, arity: 5, .. })
        ));
    }

    #[test]
    fn arg_on_atom_is_not_a_compound() {
        assert!(matches!(
            Term::atom("root").arg(1),
            Err(TermError::NotACompound(_))
        ));
    }

    #[test]
    fn expect_compound_checks_functor_and_arity() {
        let term = op_term();
        assert_eq!(term.expect_compound("op", 5).unwrap().len(), 5);
        assert!(matches!(
            term.expect_compound("op", 4),
            Err(TermError::FunctorMismatch { .. })
        ));
        assert!(matches!(
            term.expect_compound("binding", 5),
            Err(TermError::FunctorMismatch { .. })
        ));
    }

    #[test]
    fn atom_is_a_zero_arity_compound() {
        assert_eq!(Term::atom("true").expect_compound("true", 0).unwrap(), &[]);
        assert!(Term::atom("false").expect_compound("true", 0).is_err());
    }

    #[test]
    fn compound_with_no_args_collapses_to_atom() {
        assert_eq!(Term::compound("stop", vec![]), Term::atom("stop"));
    }

    #[test]
    fn expect_list_rejects_non_lists() {
        let list = Term::list(vec![Term::int(1), Term::int(2)]);
        assert_eq!(list.expect_list().unwrap().len(), 2);
        assert!(matches!(
            Term::atom("none").expect_list(),
            Err(TermError::NotAList(_))
        ));
    }

    #[test]
    fn list_iteration_is_restartable() {
        let list = Term::list(vec![Term::int(1), Term::int(2)]);
        let items = list.expect_list().unwrap();
        let first: Vec<_> = items.iter().collect();
        let second: Vec<_> = items.iter().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn atom_text_covers_identifier_encodings() {
        assert_eq!(Term::atom("root").atom_text().as_deref(), Some("root"));
        assert_eq!(Term::int(42).atom_text().as_deref(), Some("42"));
        assert_eq!(Term::var("Root").atom_text().as_deref(), Some("Root"));
        assert_eq!(op_term().atom_text(), None);
    }

    #[test]
    fn terms_serialize_for_tooling_export() {
        let term = op_term();
        let json = serde_json::to_string(&term).unwrap();
        let back: Term = serde_json::from_str(&json).unwrap();
        assert_eq!(back, term);
    }

    #[test]
    fn display_matches_wire_syntax() {
        assert_eq!(op_term().to_string(), "op(1,inc,root,s1,none)");
        assert_eq!(
            Term::list(vec![Term::atom("Hello world"), Term::var("X")]).to_string(),
            "['Hello world',X]"
        );
    }
}
