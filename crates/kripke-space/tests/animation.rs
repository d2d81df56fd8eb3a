//! Animation engine behavior against a scripted engine double

use kripke_animator::{Animator, AnimatorError, Command};
use kripke_space::{
    AnimationListener, SpaceError, StateSpace, StateSpaceConfig, StateSpaceListener, ROOT_STATE_ID,
};
use kripke_term::{Bindings, Term, TextTermOutput};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Transport double: records every request, serves scripted binding sets
/// in order
struct ScriptedAnimator {
    requests: Rc<RefCell<Vec<String>>>,
    responses: VecDeque<Bindings>,
}

impl ScriptedAnimator {
    fn new(responses: Vec<Bindings>) -> (Self, Rc<RefCell<Vec<String>>>) {
        let requests = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                requests: Rc::clone(&requests),
                responses: responses.into(),
            },
            requests,
        )
    }
}

impl Animator for ScriptedAnimator {
    fn execute(&mut self, command: &mut dyn Command) -> Result<(), AnimatorError> {
        let mut out = TextTermOutput::new();
        command.write_request(&mut out);
        self.requests.borrow_mut().push(out.into_string());
        let bindings = self
            .responses
            .pop_front()
            .ok_or_else(|| AnimatorError::Transport("response script exhausted".into()))?;
        command.process_response(&bindings)?;
        Ok(())
    }
}

fn op_term(id: i64, name: &str, src: &str, dst: &str) -> Term {
    Term::compound(
        "op",
        vec![
            Term::int(id),
            Term::atom(name),
            Term::atom(src),
            Term::atom(dst),
            Term::atom("none"),
        ],
    )
}

fn explore_response(ops: Vec<Term>, vars: Vec<(&str, &str)>, invariant_ok: bool) -> Bindings {
    let var_terms = vars
        .into_iter()
        .map(|(name, value)| {
            Term::compound(
                "binding",
                vec![Term::atom(name), Term::var("_"), Term::atom(value)],
            )
        })
        .collect();
    Bindings::new()
        .bind("Ops", Term::list(ops))
        .bind("Vars", Term::list(var_terms))
        .bind(
            "InvOk",
            Term::atom(if invariant_ok { "true" } else { "false" }),
        )
        .bind("TimeoutOccurred", Term::atom("false"))
        .bind("TimeoutOps", Term::list(vec![]))
}

fn values_response(values: Vec<&str>) -> Bindings {
    Bindings::new().bind(
        "Values",
        Term::list(values.into_iter().map(Term::atom).collect()),
    )
}

#[derive(Default)]
struct Recorder {
    moves: Rc<RefCell<Vec<(String, String, Option<String>)>>>,
    transitions: Rc<RefCell<Vec<(String, bool)>>>,
}

struct MoveRecorder(Rc<RefCell<Vec<(String, String, Option<String>)>>>);

impl AnimationListener for MoveRecorder {
    fn current_state_changed(&mut self, from: &str, to: &str, op: Option<&str>) {
        self.0
            .borrow_mut()
            .push((from.to_string(), to.to_string(), op.map(str::to_string)));
    }
}

struct TransitionRecorder(Rc<RefCell<Vec<(String, bool)>>>);

impl StateSpaceListener for TransitionRecorder {
    fn new_transition(&mut self, op_id: &str, is_dest_new: bool) {
        self.0.borrow_mut().push((op_id.to_string(), is_dest_new));
    }
}

#[test]
fn end_to_end_step_back_forward() {
    let (animator, requests) = ScriptedAnimator::new(vec![
        explore_response(
            vec![op_term(1, "inc", "root", "s1")],
            vec![("count", "0")],
            true,
        ),
        explore_response(vec![], vec![("count", "1")], true),
    ]);
    let mut space = StateSpace::new(animator);

    space.explore(ROOT_STATE_ID).unwrap();
    assert!(space.is_explored(ROOT_STATE_ID).unwrap());
    assert!(!space.is_explored("s1").unwrap());

    space.step("1").unwrap();
    assert_eq!(space.current_state(), "s1");
    assert_eq!(space.history().len(), 1);
    assert_eq!(space.history().entries()[0].op_id.as_deref(), Some("1"));

    space.back();
    assert_eq!(space.current_state(), ROOT_STATE_ID);
    assert!(space.can_go_forward());
    assert!(!space.can_go_back());

    space.forward();
    assert_eq!(space.current_state(), "s1");

    // two explorations, nothing else
    assert_eq!(requests.borrow().len(), 2);
    assert!(requests.borrow()[0].starts_with("explore_state(root,"));
    assert!(requests.borrow()[1].starts_with("explore_state(s1,"));
}

#[test]
fn step_on_a_disabled_operation_fails_without_side_effects() {
    let (animator, _) = ScriptedAnimator::new(vec![explore_response(
        vec![op_term(1, "inc", "root", "s1")],
        vec![],
        true,
    )]);
    let mut space = StateSpace::new(animator);
    space.explore(ROOT_STATE_ID).unwrap();

    let err = space.step("99").unwrap_err();
    assert!(matches!(err, SpaceError::DisabledOperation { .. }));
    assert_eq!(space.current_state(), ROOT_STATE_ID);
    assert!(space.history().is_empty());
}

#[test]
fn navigating_onto_an_explored_state_skips_the_round_trip() {
    let (animator, requests) = ScriptedAnimator::new(vec![
        explore_response(
            vec![
                op_term(1, "inc", "root", "s1"),
                op_term(2, "noop", "root", "root"),
            ],
            vec![],
            true,
        ),
        explore_response(vec![op_term(3, "dec", "s1", "root")], vec![], true),
    ]);
    let mut space = StateSpace::new(animator);
    space.explore(ROOT_STATE_ID).unwrap();
    space.step("1").unwrap();

    // root is already explored: stepping back onto it must not re-request
    space.step("3").unwrap();
    assert_eq!(space.current_state(), ROOT_STATE_ID);
    assert_eq!(requests.borrow().len(), 2);

    // the self-loop destination is explored too
    space.step("2").unwrap();
    assert_eq!(requests.borrow().len(), 2);
}

#[test]
fn exploration_merges_duplicate_operations_once() {
    let (animator, _) = ScriptedAnimator::new(vec![
        explore_response(
            vec![op_term(1, "inc", "root", "s1")],
            vec![("count", "0")],
            true,
        ),
        // re-exploration returns the same transition again
        explore_response(
            vec![op_term(1, "inc", "root", "s1")],
            vec![("count", "0")],
            true,
        ),
    ]);
    let mut space = StateSpace::new(animator);
    space.explore(ROOT_STATE_ID).unwrap();
    let before = (space.graph().edge_count(), space.graph().vertex_count());

    space.explore(ROOT_STATE_ID).unwrap();
    assert!(space.is_explored(ROOT_STATE_ID).unwrap());
    assert_eq!(
        (space.graph().edge_count(), space.graph().vertex_count()),
        before
    );
    assert_eq!(
        space.valuation(ROOT_STATE_ID).unwrap().get("count").unwrap(),
        "0"
    );
}

#[test]
fn unknown_states_are_rejected_distinctly_from_unexplored() {
    let (animator, _) = ScriptedAnimator::new(vec![]);
    let mut space = StateSpace::new(animator);

    assert!(matches!(
        space.is_explored("nowhere"),
        Err(SpaceError::UnknownState(_))
    ));
    assert!(matches!(
        space.go_to_state("nowhere"),
        Err(SpaceError::UnknownState(_))
    ));
    // root is known but unexplored: not an error
    assert!(!space.is_explored(ROOT_STATE_ID).unwrap());
}

#[test]
fn deadlock_is_zero_outgoing_edges() {
    let (animator, _) = ScriptedAnimator::new(vec![
        explore_response(vec![op_term(1, "inc", "root", "s1")], vec![], true),
        explore_response(vec![], vec![], true),
    ]);
    let mut space = StateSpace::new(animator);
    assert!(!space.is_deadlock(ROOT_STATE_ID).unwrap());
    space.step("1").unwrap();
    assert!(space.is_deadlock("s1").unwrap());
}

#[test]
fn listeners_observe_moves_and_new_transitions() {
    let (animator, _) = ScriptedAnimator::new(vec![
        explore_response(vec![op_term(1, "inc", "root", "s1")], vec![], true),
        explore_response(vec![op_term(2, "dec", "s1", "root")], vec![], true),
    ]);
    let mut space = StateSpace::new(animator);
    let recorder = Recorder::default();
    space.register_animation_listener(Box::new(MoveRecorder(Rc::clone(&recorder.moves))));
    space.register_space_listener(Box::new(TransitionRecorder(Rc::clone(
        &recorder.transitions,
    ))));

    space.explore(ROOT_STATE_ID).unwrap();
    space.step("1").unwrap();
    space.back();
    space.forward();

    // transition 1 targets a previously-unseen state, transition 2 loops
    // back to a known one
    assert_eq!(
        recorder.transitions.borrow().as_slice(),
        &[("1".to_string(), true), ("2".to_string(), false)]
    );
    assert_eq!(
        recorder.moves.borrow().as_slice(),
        &[
            (
                "root".to_string(),
                "s1".to_string(),
                Some("1".to_string())
            ),
            // back traverses the edge in reverse
            (
                "s1".to_string(),
                "root".to_string(),
                Some("1".to_string())
            ),
            (
                "root".to_string(),
                "s1".to_string(),
                Some("1".to_string())
            ),
        ]
    );
}

#[test]
fn go_to_state_records_a_jump() {
    let (animator, _) = ScriptedAnimator::new(vec![
        explore_response(vec![op_term(1, "inc", "root", "s1")], vec![], true),
        explore_response(vec![], vec![], true),
    ]);
    let mut space = StateSpace::new(animator);
    let moves = Rc::new(RefCell::new(Vec::new()));
    space.register_animation_listener(Box::new(MoveRecorder(Rc::clone(&moves))));

    space.explore(ROOT_STATE_ID).unwrap();
    space.go_to_state("s1").unwrap();
    assert_eq!(space.current_state(), "s1");
    assert_eq!(space.history().entries()[0].op_id, None);
    assert_eq!(
        moves.borrow().as_slice(),
        &[("root".to_string(), "s1".to_string(), None)]
    );
}

#[test]
fn random_walk_stops_at_a_deadlock() {
    let (animator, requests) = ScriptedAnimator::new(vec![
        explore_response(vec![op_term(1, "inc", "root", "s1")], vec![], true),
        explore_response(vec![], vec![], true),
    ]);
    let mut space = StateSpace::new(animator);

    space.random_anim(10);
    assert_eq!(space.current_state(), "s1");
    assert_eq!(space.history().len(), 1);
    // one exploration each for root and s1, nothing after the deadlock
    assert_eq!(requests.borrow().len(), 2);
}

#[test]
fn random_walk_stops_on_a_violated_invariant() {
    let (animator, _) = ScriptedAnimator::new(vec![explore_response(
        vec![op_term(1, "inc", "root", "s1")],
        vec![],
        false,
    )]);
    let mut space = StateSpace::new(animator);

    space.random_anim(10);
    // the violation is a queryable fact, not an error, and the walk ends
    assert_eq!(space.current_state(), ROOT_STATE_ID);
    assert_eq!(space.invariant_ok(ROOT_STATE_ID), Some(false));
    assert!(space.history().is_empty());
}

#[test]
fn seeded_walks_are_reproducible() {
    let script = || {
        vec![
            explore_response(
                vec![
                    op_term(1, "inc", "root", "root"),
                    op_term(2, "dec", "root", "root"),
                    op_term(3, "noop", "root", "root"),
                ],
                vec![],
                true,
            ),
        ]
    };
    let config = StateSpaceConfig {
        seed: 7,
        ..Default::default()
    };

    let (animator_a, _) = ScriptedAnimator::new(script());
    let mut first = StateSpace::with_config(animator_a, config.clone());
    first.random_anim(5);

    let (animator_b, _) = ScriptedAnimator::new(script());
    let mut second = StateSpace::with_config(animator_b, config);
    second.random_anim(5);

    assert_eq!(first.history().entries(), second.history().entries());
    assert_eq!(first.history().len(), 5);
}

#[test]
fn formula_values_are_memoized_per_state() {
    let (animator, requests) = ScriptedAnimator::new(vec![
        explore_response(
            vec![op_term(1, "inc", "root", "s1")],
            vec![("count", "0")],
            true,
        ),
        values_response(vec!["0"]),
        explore_response(vec![], vec![("count", "1")], true),
        values_response(vec!["1"]),
    ]);
    let mut space = StateSpace::new(animator);
    space.explore(ROOT_STATE_ID).unwrap();

    space.add_user_formula("count");
    space.step("1").unwrap();

    // the same formula has a distinct value in each state
    assert_eq!(space.formula_value(ROOT_STATE_ID, "count"), Some("0"));
    assert_eq!(space.formula_value("s1", "count"), Some("1"));

    // revisiting a state finds the value cached: no further round trips
    space.back();
    space.forward();
    assert_eq!(requests.borrow().len(), 4);
    assert_eq!(space.formula_value(ROOT_STATE_ID, "count"), Some("0"));
}

#[test]
fn formula_failures_are_tolerated() {
    // script ends after the exploration: evaluation hits a transport error
    let (animator, _) = ScriptedAnimator::new(vec![explore_response(vec![], vec![], true)]);
    let mut space = StateSpace::new(animator);
    space.explore(ROOT_STATE_ID).unwrap();

    space.add_user_formula("count");
    assert_eq!(space.formula_value(ROOT_STATE_ID, "count"), None);
    // the session is still usable
    assert_eq!(space.current_state(), ROOT_STATE_ID);
}

#[test]
fn predicate_search_merges_like_exploration() {
    let (animator, requests) = ScriptedAnimator::new(vec![
        explore_response(vec![op_term(1, "inc", "root", "s1")], vec![], true),
        Bindings::new()
            .bind(
                "Ops",
                Term::list(vec![op_term(9, "transfer", "root", "s2")]),
            )
            .bind("Errors", Term::list(vec![])),
        explore_response(vec![], vec![], true),
    ]);
    let mut space = StateSpace::new(animator);
    space.explore(ROOT_STATE_ID).unwrap();

    let guard = Term::compound("eq", vec![Term::atom("amount"), Term::int(5)]);
    let op = space.step_with_op("transfer", guard).unwrap();
    assert_eq!(op.id, "9");
    assert_eq!(space.current_state(), "s2");
    assert!(space.graph().contains_edge("9"));
    assert!(requests.borrow()[1].starts_with("execute_custom_operations(root,transfer,"));
}

#[test]
fn reexplore_on_visit_config_rerequests_known_states() {
    let (animator, requests) = ScriptedAnimator::new(vec![
        explore_response(
            vec![
                op_term(1, "inc", "root", "s1"),
                op_term(2, "dec", "s1", "root"),
            ],
            vec![],
            true,
        ),
        explore_response(vec![op_term(2, "dec", "s1", "root")], vec![], true),
        // stepping back onto root re-requests under this policy
        explore_response(
            vec![
                op_term(1, "inc", "root", "s1"),
                op_term(2, "dec", "s1", "root"),
            ],
            vec![],
            true,
        ),
    ]);
    let mut space = StateSpace::with_config(
        animator,
        StateSpaceConfig {
            reexplore_on_visit: true,
            ..Default::default()
        },
    );
    space.explore(ROOT_STATE_ID).unwrap();
    space.step("1").unwrap();
    space.step("2").unwrap();
    assert_eq!(requests.borrow().len(), 3);
}

#[test]
fn history_entries_export_as_json() {
    let (animator, _) = ScriptedAnimator::new(vec![
        explore_response(vec![op_term(1, "inc", "root", "s1")], vec![], true),
        explore_response(vec![], vec![], true),
    ]);
    let mut space = StateSpace::new(animator);
    space.explore(ROOT_STATE_ID).unwrap();
    space.step("1").unwrap();

    let json = serde_json::to_string(space.history().entries()).unwrap();
    assert_eq!(json, r#"[{"state_id":"s1","op_id":"1"}]"#);
}

#[test]
fn format_helpers_render_the_current_state() {
    let (animator, _) = ScriptedAnimator::new(vec![explore_response(
        vec![op_term(1, "inc", "root", "s1")],
        vec![("count", "0")],
        true,
    )]);
    let mut space = StateSpace::new(animator);
    space.explore(ROOT_STATE_ID).unwrap();

    assert_eq!(space.format_ops(), "Operations:\n  1: inc\n");
    assert_eq!(space.format_state(), "State: root\n  count -> 0\n");
}
