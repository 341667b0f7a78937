//! Lowering of a hierarchical transition table into a flat graph.
//!
//! After lowering, every edge leaves a vertex the traversal can stand on:
//! transitions configured from a compound state are copied onto each of its
//! leaves, and history targets are replaced by every state the history could
//! resolve to. Which of those traced edges is really taken is decided later,
//! per path.

use super::edge::{Edge, EdgeSpec};
use super::structure::Graph;
use crate::builder::{Branch, FsmDefinition, Target, Transition};
use crate::core::{analyze_state_tree, EventKind, StateHierarchy, INIT_STATE};

/// Graph of a machine definition.
pub type FsmGraph = Graph<Edge>;

/// Build the flattened graph of `fsm`.
///
/// Vertices are every control state in pre-order, then [`INIT_STATE`].
/// Edges follow transition order, then guard order.
pub fn build_graph(fsm: &FsmDefinition) -> FsmGraph {
    let hierarchy = analyze_state_tree(fsm.states());
    let mut vertices = fsm.states().state_names();
    vertices.push(INIT_STATE.to_string());

    let mut edges = Vec::new();
    for (transition_index, transition) in fsm.transitions().iter().enumerate() {
        for (guard_index, branch) in transition.branches().iter().enumerate() {
            let location = BranchLocation {
                transition,
                branch,
                transition_index,
                guard_index,
            };
            lower_branch(&hierarchy, &location, &mut edges);
        }
    }

    Graph::new(vertices, edges)
}

struct BranchLocation<'a> {
    transition: &'a Transition,
    branch: &'a Branch,
    transition_index: usize,
    guard_index: usize,
}

impl BranchLocation<'_> {
    fn spec(&self, from: &str, to: &str) -> EdgeSpec {
        EdgeSpec {
            from: from.to_string(),
            event: self.transition.event().map(str::to_string),
            to: to.to_string(),
            predicate: self.branch.predicate().cloned(),
            action: self.branch.action_fn().clone(),
            guard_index: self.guard_index,
            transition_index: self.transition_index,
        }
    }
}

fn lower_branch(hierarchy: &StateHierarchy, location: &BranchLocation<'_>, edges: &mut Vec<Edge>) {
    let from = location.transition.from_state();
    let is_init = EventKind::classify(location.transition.event()) == EventKind::Init;
    // `init` transitions of a compound state are taken as configured.
    let expands_origin = hierarchy.is_compound(from) && !is_init;

    match (expands_origin, location.branch.target()) {
        (false, Target::State(to)) => edges.push(Edge::Plain(location.spec(from, to))),
        (false, Target::History(history)) => {
            edges.extend(hierarchy.trace_set(history).iter().map(|to| {
                Edge::HistoryExpanded {
                    spec: location.spec(from, to),
                    history: history.clone(),
                }
            }));
        }
        (true, Target::State(to)) => {
            edges.extend(hierarchy.leaf_descendants(from).iter().map(|leaf| {
                Edge::CompoundExpanded {
                    spec: location.spec(leaf, to),
                    compound: from.to_string(),
                }
            }));
        }
        (true, Target::History(history)) => {
            for to in hierarchy.trace_set(history) {
                for leaf in hierarchy.leaf_descendants(from) {
                    edges.push(Edge::CompoundHistoryExpanded {
                        spec: location.spec(leaf, to),
                        compound: from.to_string(),
                        history: history.clone(),
                    });
                }
            }
        }
    }
}
