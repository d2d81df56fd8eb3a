//! kripke-term - term model and wire encoding for the engine protocol
//!
//! The external engine speaks a textual term protocol: every request is a
//! stream of terms terminated by a fullstop, and every response binds the
//! variables the request declared. This crate provides the pieces both sides
//! of that exchange are built from:
//!
//! - [`Term`]: the immutable protocol value (atoms, integers, variables,
//!   compound terms, lists)
//! - [`TermOutput`]: the writer contract commands emit their requests
//!   through, with a textual implementation ([`TextTermOutput`]) for the
//!   wire and a structural one ([`StructuredTermOutput`]) that rebuilds
//!   [`Term`] values
//! - [`BindingLookup`]: the read-only view of a response's variable
//!   bindings, plus resolution helpers
//!
//! # Example
//!
//! ```rust
//! use kripke_term::{TermOutput, TextTermOutput};
//!
//! let mut out = TextTermOutput::new();
//! out.open_term("explore_state");
//! out.print_atom_or_number("root");
//! out.print_variable("Ops");
//! out.close_term();
//! out.fullstop();
//! assert_eq!(out.as_str(), "explore_state(root,Ops).\n");
//! ```

mod bindings;
mod error;
mod output;
mod term;

pub use bindings::{resolve, BindingLookup, Bindings};
pub use error::{BindingError, TermError, TermResult};
pub use output::{write_term, StructuredTermOutput, TermOutput, TextTermOutput};
pub use term::Term;
