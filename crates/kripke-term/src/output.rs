//! Writers for the outgoing term stream
//!
//! Commands emit their requests through the [`TermOutput`] contract instead
//! of concatenating strings, so the same request code can target the wire
//! ([`TextTermOutput`]), a [`Term`]-rebuilding sink ([`StructuredTermOutput`]),
//! or a delegating wrapper (the composer's variable-prefixing view).
//!
//! Open/close calls must balance. An unbalanced sequence is a programmer
//! error in the command that wrote it, not a recoverable condition, and
//! panics.

use crate::term::Term;
use num_bigint::BigInt;

/// Sink for a stream of terms
///
/// The call protocol is positional: inside `open_term`/`close_term` (or
/// `open_list`/`close_list`) each `print_*` or nested `open_*` call emits
/// the next argument (or element). `fullstop` terminates a sentence and is
/// only legal with every term and list closed.
pub trait TermOutput {
    /// Start a compound term with the given functor
    fn open_term(&mut self, functor: &str);
    /// Emit an atom, quoted on the wire if its spelling requires it
    fn print_atom(&mut self, content: &str);
    /// Emit a machine-sized integer
    fn print_number(&mut self, value: i64);
    /// Emit an arbitrary-precision integer
    fn print_bignum(&mut self, value: &BigInt);
    /// Emit `content` as an integer if it parses as one, as an atom otherwise.
    ///
    /// State and operation identifiers are opaque strings that the engine
    /// assigns from either lexical space; this keeps them round-trippable.
    fn print_atom_or_number(&mut self, content: &str);
    /// Emit a variable for the engine to bind in its response
    fn print_variable(&mut self, name: &str);
    /// Start a list
    fn open_list(&mut self);
    /// End the innermost open list
    fn close_list(&mut self);
    /// End the innermost open compound term
    fn close_term(&mut self);
    /// Terminate the current sentence
    fn fullstop(&mut self);
}

/// Append `content` to `buf` in wire atom syntax, quoting when needed
pub(crate) fn push_atom(buf: &mut String, content: &str) {
    if is_unquoted_atom(content) {
        buf.push_str(content);
    } else {
        buf.push('\'');
        for c in content.chars() {
            match c {
                '\'' => buf.push_str("\\'"),
                '\\' => buf.push_str("\\\\"),
                '\n' => buf.push_str("\\n"),
                '\t' => buf.push_str("\\t"),
                other => buf.push(other),
            }
        }
        buf.push('\'');
    }
}

fn is_unquoted_atom(content: &str) -> bool {
    let mut chars = content.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Term,
    List,
}

#[derive(Debug)]
struct TextFrame {
    kind: FrameKind,
    has_elements: bool,
}

/// [`TermOutput`] implementation producing the textual wire form
///
/// Successive elements at every nesting level are comma-separated; a batch
/// of top-level terms therefore reads as one conjunction, terminated by the
/// fullstop.
#[derive(Debug, Default)]
pub struct TextTermOutput {
    buf: String,
    stack: Vec<TextFrame>,
    sentence_has_terms: bool,
}

impl TextTermOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// The text written so far
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Consume the writer and return the written text
    pub fn into_string(self) -> String {
        self.buf
    }

    fn before_element(&mut self) {
        let has_elements = match self.stack.last_mut() {
            Some(frame) => std::mem::replace(&mut frame.has_elements, true),
            None => std::mem::replace(&mut self.sentence_has_terms, true),
        };
        if has_elements {
            self.buf.push(',');
        }
    }
}

impl TermOutput for TextTermOutput {
    fn open_term(&mut self, functor: &str) {
        self.before_element();
        push_atom(&mut self.buf, functor);
        self.buf.push('(');
        self.stack.push(TextFrame {
            kind: FrameKind::Term,
            has_elements: false,
        });
    }

    fn print_atom(&mut self, content: &str) {
        self.before_element();
        push_atom(&mut self.buf, content);
    }

    fn print_number(&mut self, value: i64) {
        self.before_element();
        self.buf.push_str(&value.to_string());
    }

    fn print_bignum(&mut self, value: &BigInt) {
        self.before_element();
        self.buf.push_str(&value.to_string());
    }

    fn print_atom_or_number(&mut self, content: &str) {
        match content.parse::<BigInt>() {
            Ok(value) => self.print_bignum(&value),
            Err(_) => self.print_atom(content),
        }
    }

    fn print_variable(&mut self, name: &str) {
        self.before_element();
        self.buf.push_str(name);
    }

    fn open_list(&mut self) {
        self.before_element();
        self.buf.push('[');
        self.stack.push(TextFrame {
            kind: FrameKind::List,
            has_elements: false,
        });
    }

    fn close_list(&mut self) {
        match self.stack.pop() {
            Some(TextFrame {
                kind: FrameKind::List,
                ..
            }) => self.buf.push(']'),
            _ => panic!("close_list without matching open_list"),
        }
    }

    fn close_term(&mut self) {
        match self.stack.pop() {
            Some(TextFrame {
                kind: FrameKind::Term,
                ..
            }) => self.buf.push(')'),
            _ => panic!("close_term without matching open_term"),
        }
    }

    fn fullstop(&mut self) {
        assert!(
            self.stack.is_empty(),
            "fullstop inside an unterminated term or list"
        );
        self.buf.push_str(".\n");
        self.sentence_has_terms = false;
    }
}

#[derive(Debug)]
enum StructuredFrame {
    Compound { functor: String, args: Vec<Term> },
    List(Vec<Term>),
}

/// [`TermOutput`] implementation that rebuilds [`Term`] values
///
/// Used where the request structure matters rather than its spelling:
/// tests assert on the terms a command wrote, and load sequences embed
/// previously built terms.
#[derive(Debug, Default)]
pub struct StructuredTermOutput {
    stack: Vec<StructuredFrame>,
    terms: Vec<Term>,
}

impl StructuredTermOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// The completed top-level terms, in writing order
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Consume the writer and return the completed top-level terms
    pub fn into_terms(self) -> Vec<Term> {
        assert!(
            self.stack.is_empty(),
            "writer dropped with an unterminated term or list"
        );
        self.terms
    }

    fn emit(&mut self, term: Term) {
        match self.stack.last_mut() {
            Some(StructuredFrame::Compound { args, .. }) => args.push(term),
            Some(StructuredFrame::List(items)) => items.push(term),
            None => self.terms.push(term),
        }
    }
}

impl TermOutput for StructuredTermOutput {
    fn open_term(&mut self, functor: &str) {
        self.stack.push(StructuredFrame::Compound {
            functor: functor.to_string(),
            args: Vec::new(),
        });
    }

    fn print_atom(&mut self, content: &str) {
        self.emit(Term::Atom(content.to_string()));
    }

    fn print_number(&mut self, value: i64) {
        self.emit(Term::Int(value.into()));
    }

    fn print_bignum(&mut self, value: &BigInt) {
        self.emit(Term::Int(value.clone()));
    }

    fn print_atom_or_number(&mut self, content: &str) {
        match content.parse::<BigInt>() {
            Ok(value) => self.emit(Term::Int(value)),
            Err(_) => self.emit(Term::Atom(content.to_string())),
        }
    }

    fn print_variable(&mut self, name: &str) {
        self.emit(Term::Var(name.to_string()));
    }

    fn open_list(&mut self) {
        self.stack.push(StructuredFrame::List(Vec::new()));
    }

    fn close_list(&mut self) {
        match self.stack.pop() {
            Some(StructuredFrame::List(items)) => self.emit(Term::List(items)),
            _ => panic!("close_list without matching open_list"),
        }
    }

    fn close_term(&mut self) {
        match self.stack.pop() {
            Some(StructuredFrame::Compound { functor, args }) => {
                self.emit(Term::compound(functor, args));
            }
            _ => panic!("close_term without matching open_term"),
        }
    }

    fn fullstop(&mut self) {
        assert!(
            self.stack.is_empty(),
            "fullstop inside an unterminated term or list"
        );
    }
}

/// Emit an already-built term through a writer
pub fn write_term(out: &mut dyn TermOutput, term: &Term) {
    match term {
        Term::Atom(name) => out.print_atom(name),
        Term::Int(value) => out.print_bignum(value),
        Term::Var(name) => out.print_variable(name),
        Term::Compound { functor, args } => {
            out.open_term(functor);
            for arg in args {
                write_term(out, arg);
            }
            out.close_term();
        }
        Term::List(items) => {
            out.open_list();
            for item in items {
                write_term(out, item);
            }
            out.close_list();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_term_text() {
        let mut out = TextTermOutput::new();
        out.open_term("execute_custom_operations");
        out.print_atom_or_number("5");
        out.print_atom("inc");
        out.open_list();
        out.print_atom("guard");
        out.print_number(2);
        out.close_list();
        out.print_variable("Ops");
        out.close_term();
        out.fullstop();
        assert_eq!(
            out.as_str(),
            "execute_custom_operations(5,inc,[guard,2],Ops).\n"
        );
    }

    #[test]
    fn atoms_are_quoted_when_needed() {
        let mut out = TextTermOutput::new();
        out.print_atom("root");
        out.print_atom("Hello world");
        out.print_atom("it's");
        out.print_atom("");
        out.fullstop();
        assert_eq!(out.as_str(), "root,'Hello world','it\\'s',''.\n");
    }

    #[test]
    fn atom_or_number_distinguishes_identifiers() {
        let mut out = TextTermOutput::new();
        out.print_atom_or_number("17");
        out.print_atom_or_number("-3");
        out.print_atom_or_number("root");
        out.print_atom_or_number("17a");
        out.fullstop();
        assert_eq!(out.as_str(), "17,-3,root,'17a'.\n");
    }

    #[test]
    fn empty_list_and_sentence_separation() {
        let mut out = TextTermOutput::new();
        out.print_atom("clear_machine");
        out.print_atom("start_animation");
        out.open_list();
        out.close_list();
        out.fullstop();
        out.print_atom("next_sentence");
        out.fullstop();
        assert_eq!(out.as_str(), "clear_machine,start_animation,[].\nnext_sentence.\n");
    }

    #[test]
    #[should_panic(expected = "close_term without matching open_term")]
    fn unbalanced_close_term_panics() {
        let mut out = TextTermOutput::new();
        out.open_list();
        out.close_term();
    }

    #[test]
    #[should_panic(expected = "fullstop inside an unterminated term")]
    fn fullstop_with_open_term_panics() {
        let mut out = TextTermOutput::new();
        out.open_term("explore_state");
        out.fullstop();
    }

    #[test]
    fn structured_writer_rebuilds_terms() {
        let mut out = StructuredTermOutput::new();
        out.open_term("op");
        out.print_number(1);
        out.print_atom("inc");
        out.open_list();
        out.print_variable("X");
        out.close_list();
        out.close_term();
        out.fullstop();
        assert_eq!(
            out.into_terms(),
            vec![Term::compound(
                "op",
                vec![Term::int(1), Term::atom("inc"), Term::list(vec![Term::var("X")])]
            )]
        );
    }

    #[test]
    fn write_term_round_trips_through_structured_writer() {
        let term = Term::compound(
            "binding",
            vec![
                Term::atom("x"),
                Term::var("_"),
                Term::list(vec![Term::int(1), Term::atom("Hello world")]),
            ],
        );
        let mut out = StructuredTermOutput::new();
        write_term(&mut out, &term);
        assert_eq!(out.terms(), &[term]);
    }
}
