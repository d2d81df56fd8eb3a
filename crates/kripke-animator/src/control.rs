//! Session control commands and the load handshake

use crate::command::{Animator, Command};
use crate::composed::ComposedCommand;
use crate::error::{AnimatorResult, CommandError};
use crate::explore::{ExploreStateCommand, StateProperties};
use crate::op::Operation;
use crate::ROOT_STATE_ID;
use kripke_term::{write_term, BindingLookup, Term, TermOutput};
use tracing::debug;

/// Set one engine-side preference for the session.
///
/// Request: `set_preference(Key, Value)`; the engine binds nothing.
#[derive(Debug)]
pub struct SetPreferenceCommand {
    key: String,
    value: String,
}

impl SetPreferenceCommand {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl Command for SetPreferenceCommand {
    fn write_request(&self, out: &mut dyn TermOutput) {
        out.open_term("set_preference");
        out.print_atom(&self.key);
        out.print_atom(&self.value);
        out.close_term();
        out.fullstop();
    }

    fn process_response(&mut self, _bindings: &dyn BindingLookup) -> Result<(), CommandError> {
        // no result variables
        Ok(())
    }
}

/// Begin animation of the loaded model
#[derive(Debug, Default)]
pub struct StartAnimationCommand;

impl Command for StartAnimationCommand {
    fn write_request(&self, out: &mut dyn TermOutput) {
        out.print_atom("start_animation");
        out.fullstop();
    }

    fn process_response(&mut self, _bindings: &dyn BindingLookup) -> Result<(), CommandError> {
        Ok(())
    }
}

/// Discard any model currently loaded in the engine
#[derive(Debug, Default)]
pub struct ClearMachineCommand;

impl Command for ClearMachineCommand {
    fn write_request(&self, out: &mut dyn TermOutput) {
        out.print_atom("clear_machine");
        out.fullstop();
    }

    fn process_response(&mut self, _bindings: &dyn BindingLookup) -> Result<(), CommandError> {
        Ok(())
    }
}

/// Hand the engine a model term produced by a language front end.
///
/// Request: `load_model(<model>)`; the engine binds nothing. This crate
/// does not parse source specifications; the term arrives ready-made.
#[derive(Debug)]
pub struct LoadModelCommand {
    model: Term,
}

impl LoadModelCommand {
    pub fn new(model: Term) -> Self {
        Self { model }
    }
}

impl Command for LoadModelCommand {
    fn write_request(&self, out: &mut dyn TermOutput) {
        out.open_term("load_model");
        write_term(out, &self.model);
        out.close_term();
        out.fullstop();
    }

    fn process_response(&mut self, _bindings: &dyn BindingLookup) -> Result<(), CommandError> {
        Ok(())
    }
}

/// Run the fresh-session handshake as one composed round trip:
/// clear the machine, apply preferences, load the model, start animation,
/// and explore the root state. Returns the root's operations and
/// properties.
pub fn run_load_sequence(
    animator: &mut dyn Animator,
    model: Term,
    preferences: &[(&str, &str)],
) -> AnimatorResult<(Vec<Operation>, StateProperties)> {
    let mut clear = ClearMachineCommand;
    let mut prefs: Vec<SetPreferenceCommand> = preferences
        .iter()
        .map(|(key, value)| SetPreferenceCommand::new(*key, *value))
        .collect();
    let mut load = LoadModelCommand::new(model);
    let mut start = StartAnimationCommand;
    let mut explore = ExploreStateCommand::new(ROOT_STATE_ID);

    {
        let mut commands: Vec<&mut dyn Command> = Vec::with_capacity(4 + prefs.len());
        commands.push(&mut clear);
        for pref in &mut prefs {
            commands.push(pref);
        }
        commands.push(&mut load);
        commands.push(&mut start);
        commands.push(&mut explore);
        let mut composed = ComposedCommand::new(commands);
        animator.execute(&mut composed)?;
    }

    debug!(preferences = preferences.len(), "load sequence completed");
    explore.into_results().ok_or_else(|| {
        CommandError::Protocol("load sequence response did not include exploration results".into())
            .into()
    })
}
