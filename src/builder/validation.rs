//! Validation of machine definitions.
//!
//! Uses `Validation` to report every problem of a definition at once instead
//! of stopping at the first one.

use crate::builder::transition::{Target, Transition};
use crate::core::{analyze_state_tree, is_init_state, EventKind, StateTree};
use std::collections::HashSet;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// A problem found in a machine definition.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DefinitionIssue {
    #[error("control state '{0}' is declared more than once")]
    DuplicateState(String),

    #[error("control state name '{0}' is reserved for the initial state")]
    ReservedStateName(String),

    #[error("transition #{transition_index} leaves unknown state '{state}'")]
    UnknownOrigin {
        transition_index: usize,
        state: String,
    },

    #[error("transition #{transition_index}, guard #{guard_index} targets unknown state '{state}'")]
    UnknownTarget {
        transition_index: usize,
        guard_index: usize,
        state: String,
    },

    #[error(
        "transition #{transition_index}, guard #{guard_index}: history parent '{state}' is not a compound state"
    )]
    InvalidHistoryParent {
        transition_index: usize,
        guard_index: usize,
        state: String,
    },

    #[error("transition #{transition_index}, guard #{guard_index}: init transitions cannot target history of '{state}'")]
    HistoryOnInit {
        transition_index: usize,
        guard_index: usize,
        state: String,
    },

    #[error("no init transition leaves the initial state")]
    MissingInitialTransition,
}

type Check = Validation<(), NonEmptyVec<DefinitionIssue>>;

fn check(holds: bool, issue: impl FnOnce() -> DefinitionIssue) -> Check {
    if holds {
        Validation::success(())
    } else {
        Validation::fail(issue())
    }
}

/// Check a definition, accumulating ALL issues.
pub fn validate_definition(
    states: &StateTree,
    transitions: &[Transition],
) -> Validation<(), NonEmptyVec<DefinitionIssue>> {
    let hierarchy = analyze_state_tree(states);
    let mut checks: Vec<Check> = Vec::new();

    let mut seen = HashSet::new();
    for name in states.state_names() {
        checks.push(check(!is_init_state(&name), || {
            DefinitionIssue::ReservedStateName(name.clone())
        }));
        let first = seen.insert(name.clone());
        checks.push(check(first, || DefinitionIssue::DuplicateState(name.clone())));
    }

    let known = |state: &str| states.contains(state);
    for (transition_index, transition) in transitions.iter().enumerate() {
        let from = transition.from_state();
        let is_init = EventKind::classify(transition.event()) == EventKind::Init;
        checks.push(check(is_init_state(from) || known(from), || {
            DefinitionIssue::UnknownOrigin {
                transition_index,
                state: from.to_string(),
            }
        }));

        for (guard_index, branch) in transition.branches().iter().enumerate() {
            let result = match branch.target() {
                Target::State(state) => check(known(state), || DefinitionIssue::UnknownTarget {
                    transition_index,
                    guard_index,
                    state: state.clone(),
                }),
                Target::History(history) => {
                    check(hierarchy.is_compound(history.parent()), || {
                        DefinitionIssue::InvalidHistoryParent {
                            transition_index,
                            guard_index,
                            state: history.parent().to_string(),
                        }
                    })
                }
            };
            checks.push(result);

            if let Some(history) = branch.target().as_history() {
                checks.push(check(!is_init, || DefinitionIssue::HistoryOnInit {
                    transition_index,
                    guard_index,
                    state: history.parent().to_string(),
                }));
            }
        }
    }

    let has_initial_transition = transitions.iter().any(|transition| {
        is_init_state(transition.from_state())
            && EventKind::classify(transition.event()) == EventKind::Init
    });
    checks.push(check(has_initial_transition, || {
        DefinitionIssue::MissingInitialTransition
    }));

    Validation::all_vec(checks).map(|_| ())
}
