//! The animation engine: graph + history + live engine session

use crate::error::{SpaceError, SpaceResult};
use crate::graph::StateGraph;
use crate::history::History;
use indexmap::IndexMap;
use kripke_animator::{
    Animator, Command, EvaluateFormulasCommand, ExploreStateCommand,
    GetOperationByPredicateCommand, Operation, StateProperties, ROOT_STATE_ID,
};
use kripke_term::Term;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;
use tracing::{debug, error, warn};

/// Notified after every animation move with (from, to, operation-or-none)
pub trait AnimationListener {
    fn current_state_changed(&mut self, from: &str, to: &str, op: Option<&str>);
}

/// Notified when a transition is first added to the graph
pub trait StateSpaceListener {
    fn new_transition(&mut self, op_id: &str, is_dest_new: bool);
}

/// Tunables for one animation session
#[derive(Debug, Clone)]
pub struct StateSpaceConfig {
    /// Seed for the random-walk step choice
    pub seed: u64,
    /// Re-issue the exploration request when navigating onto an
    /// already-explored state.
    ///
    /// Off by default: with a non-deterministic engine, re-requesting can
    /// silently overwrite a state's recorded valuation. Enable only when
    /// the engine's answers for a state can legitimately change.
    pub reexplore_on_visit: bool,
}

impl Default for StateSpaceConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            reexplore_on_visit: false,
        }
    }
}

/// One animation session: the lazily-built state space, the undo/redo
/// history, and the engine connection they are fed from.
///
/// All calls are synchronous and blocking; a session must be driven from a
/// single logical thread of control. Listeners are notified synchronously
/// in registration order and must not re-enter the session from their
/// callbacks.
pub struct StateSpace<A> {
    animator: A,
    config: StateSpaceConfig,
    graph: StateGraph,
    history: History,
    explored: FxHashSet<String>,
    ops: FxHashMap<String, Operation>,
    properties: FxHashMap<String, StateProperties>,
    formulas: Vec<String>,
    /// state id -> formula text -> value; two-level on purpose, the same
    /// formula takes different values in different states
    formula_values: FxHashMap<String, IndexMap<String, String>>,
    animation_listeners: Vec<Box<dyn AnimationListener>>,
    space_listeners: Vec<Box<dyn StateSpaceListener>>,
    rng: StdRng,
}

impl<A: Animator> StateSpace<A> {
    pub fn new(animator: A) -> Self {
        Self::with_config(animator, StateSpaceConfig::default())
    }

    pub fn with_config(animator: A, config: StateSpaceConfig) -> Self {
        let mut graph = StateGraph::new();
        graph.add_vertex(ROOT_STATE_ID);
        Self {
            rng: StdRng::seed_from_u64(config.seed),
            animator,
            config,
            graph,
            history: History::new(),
            explored: FxHashSet::default(),
            ops: FxHashMap::default(),
            properties: FxHashMap::default(),
            formulas: Vec::new(),
            formula_values: FxHashMap::default(),
            animation_listeners: Vec::new(),
            space_listeners: Vec::new(),
        }
    }

    /// Query the engine for a state's outgoing transitions, valuation, and
    /// invariant/timeout status, and merge the answer into the space.
    ///
    /// Always issues the round trip; the navigation layer guards against
    /// redundant requests (see [`StateSpaceConfig::reexplore_on_visit`]).
    pub fn explore(&mut self, state_id: &str) -> SpaceResult<()> {
        let mut command = ExploreStateCommand::new(state_id);
        if let Err(err) = self.animator.execute(&mut command) {
            error!(state = state_id, error = %err, "state exploration failed");
            return Err(err.into());
        }
        let Some((operations, properties)) = command.into_results() else {
            return Err(SpaceError::Animator(
                kripke_animator::CommandError::Protocol(
                    "exploration response carried no results".into(),
                )
                .into(),
            ));
        };

        self.graph.add_vertex(state_id);
        self.explored.insert(state_id.to_string());
        self.merge_operations(&operations);
        self.properties.insert(state_id.to_string(), properties);
        debug!(
            state = state_id,
            vertices = self.graph.vertex_count(),
            edges = self.graph.edge_count(),
            "state space grew"
        );
        Ok(())
    }

    /// Fire an enabled operation from the current state.
    ///
    /// Fails with [`SpaceError::DisabledOperation`] when `op_id` is not an
    /// outgoing edge of the current state; otherwise explores the
    /// destination if needed, appends to the history, re-evaluates user
    /// formulas there, and notifies animation listeners.
    pub fn step(&mut self, op_id: &str) -> SpaceResult<()> {
        let current = self.history.current_state().to_string();
        if !self.graph.out_edges(&current).iter().any(|id| id == op_id) {
            return Err(SpaceError::DisabledOperation {
                op_id: op_id.to_string(),
                state_id: current,
            });
        }
        let Some((src, dst)) = self.graph.endpoints(op_id) else {
            return Err(SpaceError::DisabledOperation {
                op_id: op_id.to_string(),
                state_id: current,
            });
        };
        let (src, dst) = (src.to_string(), dst.to_string());

        self.ensure_explored(&dst)?;
        self.history.add(dst.clone(), Some(op_id.to_string()));
        self.evaluate_formulas();
        self.notify_animation(&src, &dst, Some(op_id));
        Ok(())
    }

    /// Jump to an arbitrary known state, explored or not.
    ///
    /// The history records the jump without an operation id.
    pub fn go_to_state(&mut self, state_id: &str) -> SpaceResult<()> {
        if !self.graph.contains_vertex(state_id) {
            return Err(SpaceError::UnknownState(state_id.to_string()));
        }
        self.ensure_explored(state_id)?;
        let from = self.history.current_state().to_string();
        self.history.add(state_id.to_string(), None);
        self.evaluate_formulas();
        self.notify_animation(&from, state_id, None);
        Ok(())
    }

    /// Move one step back in the history; no engine round trip
    pub fn back(&mut self) {
        if !self.history.can_go_back() {
            return;
        }
        let old = self.history.current_state().to_string();
        let op = self.history.current_transition().map(str::to_string);
        self.history.back();
        self.evaluate_formulas();
        match op.as_deref().and_then(|id| {
            self.graph
                .endpoints(id)
                .map(|(src, dst)| (src.to_string(), dst.to_string()))
        }) {
            // traversed backwards: from the edge's destination to its source
            Some((src, dst)) => self.notify_animation(&dst, &src, op.as_deref()),
            None => {
                let current = self.history.current_state().to_string();
                self.notify_animation(&old, &current, None);
            }
        }
    }

    /// Move one step forward in the history; no engine round trip
    pub fn forward(&mut self) {
        if !self.history.can_go_forward() {
            return;
        }
        let old = self.history.current_state().to_string();
        self.history.forward();
        self.evaluate_formulas();
        let op = self.history.current_transition().map(str::to_string);
        match op.as_deref().and_then(|id| {
            self.graph
                .endpoints(id)
                .map(|(src, dst)| (src.to_string(), dst.to_string()))
        }) {
            Some((src, dst)) => self.notify_animation(&src, &dst, op.as_deref()),
            None => {
                let current = self.history.current_state().to_string();
                self.notify_animation(&old, &current, None);
            }
        }
    }

    /// Ask the engine to synthesize up to `max_solutions` transitions named
    /// `name` at `state_id` satisfying `predicate`, and merge them into the
    /// graph exactly like an exploration does
    pub fn op_from_predicate(
        &mut self,
        state_id: &str,
        name: &str,
        predicate: Term,
        max_solutions: usize,
    ) -> SpaceResult<Vec<Operation>> {
        let mut command =
            GetOperationByPredicateCommand::new(state_id, name, predicate, max_solutions);
        self.animator.execute(&mut command)?;
        let Some(operations) = command.into_operations() else {
            return Err(SpaceError::Animator(
                kripke_animator::CommandError::Protocol(
                    "predicate search response carried no results".into(),
                )
                .into(),
            ));
        };
        self.merge_operations(&operations);
        Ok(operations)
    }

    /// Find exactly one transition via predicate search at the current
    /// state
    pub fn exec_one_op(&mut self, name: &str, predicate: Term) -> SpaceResult<Operation> {
        let current = self.history.current_state().to_string();
        let mut found = self.op_from_predicate(&current, name, predicate, 1)?;
        found.pop().ok_or(SpaceError::NoMatchingOperation {
            name: name.to_string(),
            state_id: current,
        })
    }

    /// Find one transition via predicate search, then step through it
    pub fn step_with_op(&mut self, name: &str, predicate: Term) -> SpaceResult<Operation> {
        let op = self.exec_one_op(name, predicate)?;
        self.step(&op.id)?;
        Ok(op)
    }

    /// Take up to `steps` uniformly-random enabled transitions from the
    /// current state.
    ///
    /// Stops early, without error, on a deadlock, on a state whose
    /// invariant is known to be violated, or when a step fails; failures
    /// are logged, the walk is advisory.
    pub fn random_anim(&mut self, steps: usize) {
        for _ in 0..steps {
            let state = self.history.current_state().to_string();
            let deadlock = match self.is_deadlock(&state) {
                Ok(deadlock) => deadlock,
                Err(err) => {
                    error!(state = %state, error = %err, "random walk could not explore state");
                    return;
                }
            };
            if deadlock {
                return;
            }
            if self.invariant_ok(&state) == Some(false) {
                return;
            }
            let outgoing = self.graph.out_edges(&state);
            let op_id = outgoing[self.rng.gen_range(0..outgoing.len())].clone();
            if let Err(err) = self.step(&op_id) {
                warn!(op = %op_id, error = %err, "random step failed");
                return;
            }
        }
    }

    /// Whether a state has zero outgoing transitions, exploring it first
    /// if needed
    pub fn is_deadlock(&mut self, state_id: &str) -> SpaceResult<bool> {
        if !self.graph.contains_vertex(state_id) {
            return Err(SpaceError::UnknownState(state_id.to_string()));
        }
        self.ensure_explored(state_id)?;
        Ok(self.graph.out_edges(state_id).is_empty())
    }

    /// Whether a known state has been explored.
    ///
    /// A state id that is not even a vertex is an error, distinct from
    /// known-but-unexplored.
    pub fn is_explored(&self, state_id: &str) -> SpaceResult<bool> {
        if !self.graph.contains_vertex(state_id) {
            return Err(SpaceError::UnknownState(state_id.to_string()));
        }
        Ok(self.explored.contains(state_id))
    }

    /// Register a formula to be evaluated at every visited state.
    ///
    /// Evaluated immediately at the current state; values are memoized per
    /// (state, formula) and never overwritten.
    pub fn add_user_formula(&mut self, formula: impl Into<String>) {
        self.formulas.push(formula.into());
        self.evaluate_formulas();
    }

    /// Evaluate registered formulas at the current state, skipping the
    /// round trip entirely when every formula already has a value here.
    ///
    /// Failures are logged and tolerated: formula values are advisory, not
    /// structural.
    pub fn evaluate_formulas(&mut self) {
        let state = self.history.current_state().to_string();
        let pending: Vec<String> = self
            .formulas
            .iter()
            .filter(|formula| {
                !self
                    .formula_values
                    .get(&state)
                    .is_some_and(|cache| cache.contains_key(*formula))
            })
            .cloned()
            .collect();
        if pending.is_empty() {
            return;
        }

        let mut command = EvaluateFormulasCommand::new(state.as_str(), pending);
        match self.animator.execute(&mut command) {
            Ok(()) => {
                if let Some(results) = command.results() {
                    let cache = self.formula_values.entry(state).or_default();
                    for (formula, value) in results {
                        cache
                            .entry(formula.to_string())
                            .or_insert_with(|| value.to_string());
                    }
                }
            }
            Err(err) => {
                warn!(state = %state, error = %err, "formula evaluation failed");
            }
        }
    }

    /// The memoized value of a formula at a state, if it was evaluated
    /// there
    pub fn formula_value(&self, state_id: &str, formula: &str) -> Option<&str> {
        self.formula_values
            .get(state_id)?
            .get(formula)
            .map(String::as_str)
    }

    /// Run an arbitrary command against this session's engine connection
    pub fn execute(&mut self, command: &mut dyn Command) -> SpaceResult<()> {
        self.animator.execute(command).map_err(SpaceError::from)
    }

    pub fn register_animation_listener(&mut self, listener: Box<dyn AnimationListener>) {
        self.animation_listeners.push(listener);
    }

    pub fn register_space_listener(&mut self, listener: Box<dyn StateSpaceListener>) {
        self.space_listeners.push(listener);
    }

    pub fn current_state(&self) -> &str {
        self.history.current_state()
    }

    pub fn can_go_back(&self) -> bool {
        self.history.can_go_back()
    }

    pub fn can_go_forward(&self) -> bool {
        self.history.can_go_forward()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn graph(&self) -> &StateGraph {
        &self.graph
    }

    pub fn operation(&self, op_id: &str) -> Option<&Operation> {
        self.ops.get(op_id)
    }

    /// A state's recorded properties, once it has been explored
    pub fn state_properties(&self, state_id: &str) -> Option<&StateProperties> {
        self.properties.get(state_id)
    }

    pub fn valuation(&self, state_id: &str) -> Option<&IndexMap<String, String>> {
        self.properties.get(state_id).map(|props| &props.values)
    }

    pub fn invariant_ok(&self, state_id: &str) -> Option<bool> {
        self.properties.get(state_id).map(|props| props.invariant_ok)
    }

    pub fn timeout_occurred(&self, state_id: &str) -> Option<bool> {
        self.properties
            .get(state_id)
            .map(|props| props.timeout_occurred)
    }

    pub fn timed_out_operations(&self, state_id: &str) -> Option<&BTreeSet<String>> {
        self.properties
            .get(state_id)
            .map(|props| &props.timed_out_operations)
    }

    pub fn animator(&self) -> &A {
        &self.animator
    }

    pub fn animator_mut(&mut self) -> &mut A {
        &mut self.animator
    }

    pub fn config(&self) -> &StateSpaceConfig {
        &self.config
    }

    /// The enabled operations at the current state, one per line
    pub fn format_ops(&self) -> String {
        let current = self.history.current_state();
        let mut out = String::from("Operations:\n");
        for op_id in self.graph.out_edges(current) {
            if let Some(op) = self.ops.get(op_id) {
                out.push_str(&format!("  {}: {}\n", op.id, op));
            }
        }
        out
    }

    /// The current state's valuation, one variable per line
    pub fn format_state(&self) -> String {
        let current = self.history.current_state();
        let mut out = format!("State: {}\n", current);
        if let Some(props) = self.properties.get(current) {
            for (name, value) in &props.values {
                out.push_str(&format!("  {} -> {}\n", name, value));
            }
        }
        out
    }

    fn ensure_explored(&mut self, state_id: &str) -> SpaceResult<()> {
        if self.config.reexplore_on_visit || !self.explored.contains(state_id) {
            self.explore(state_id)?;
        }
        Ok(())
    }

    /// Insert operations as edges, skipping ids already present; fires the
    /// state-space listeners for each genuinely new transition
    fn merge_operations(&mut self, operations: &[Operation]) {
        for op in operations {
            if self.graph.contains_edge(&op.id) {
                continue;
            }
            let dest_is_new = !self.graph.contains_vertex(&op.dst);
            self.ops.insert(op.id.clone(), op.clone());
            for listener in &mut self.space_listeners {
                listener.new_transition(&op.id, dest_is_new);
            }
            self.graph
                .add_edge(op.id.clone(), op.src.clone(), op.dst.clone());
        }
    }

    fn notify_animation(&mut self, from: &str, to: &str, op: Option<&str>) {
        for listener in &mut self.animation_listeners {
            listener.current_state_changed(from, to, op);
        }
    }
}
