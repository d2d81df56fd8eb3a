//! The operation (transition) domain object

use crate::command::field_text;
use crate::error::CommandError;
use kripke_term::Term;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named transition between two states.
///
/// Created when an exploration or predicate-search response lists it;
/// immutable thereafter. The `id` is unique within a state space and is
/// the edge key in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operation {
    /// Engine-assigned transition identifier
    pub id: String,
    /// Source-level event name
    pub name: String,
    /// Source state id
    pub src: String,
    /// Destination state id
    pub dst: String,
    /// Ordered event parameters, or `None` for a parameterless event
    pub params: Option<Vec<OpParameter>>,
}

/// One named event parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpParameter {
    pub name: String,
    pub value: String,
}

impl Operation {
    /// Decode the protocol's 5-tuple `op(Id, Name, Src, Dst, Params)`.
    ///
    /// `Params` is either the atom `none` or a list of `param(Name, Value)`
    /// pairs.
    pub fn from_term(term: &Term) -> Result<Operation, CommandError> {
        let args = term.expect_compound("op", 5)?;
        let id = field_text(&args[0], "operation id")?;
        let name = field_text(&args[1], "operation name")?;
        let src = field_text(&args[2], "source state id")?;
        let dst = field_text(&args[3], "destination state id")?;
        let params = match &args[4] {
            Term::Atom(marker) if marker == "none" => None,
            Term::List(items) => {
                let mut params = Vec::with_capacity(items.len());
                for item in items {
                    let pair = item.expect_compound("param", 2)?;
                    params.push(OpParameter {
                        name: field_text(&pair[0], "parameter name")?,
                        value: field_text(&pair[1], "parameter value")?,
                    });
                }
                Some(params)
            }
            other => {
                return Err(CommandError::Protocol(format!(
                    "expected parameter list or none, got {}",
                    other
                )))
            }
        };
        Ok(Operation {
            id,
            name,
            src,
            dst,
            params,
        })
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(params) = &self.params {
            write!(f, "(")?;
            for (i, param) in params.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}={}", param.name, param.value)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}
