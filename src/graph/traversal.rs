//! Depth-first search over the edges of a graph.
//!
//! The search threads two states: a path state, cloned per branch so sibling
//! branches never see each other's changes, and a goal state shared by the
//! whole search that accumulates results.

use super::structure::{EdgeId, Graph, GraphEdge};

/// Outcome of visiting one edge.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeVisit<P> {
    /// Path state after taking the edge.
    pub path_state: P,
    /// Whether the search may continue along this edge.
    pub is_traversable: bool,
}

/// Outcome of evaluating the goal after a traversable edge.
#[derive(Clone, Debug, PartialEq)]
pub struct GoalEvaluation<G> {
    /// A reached goal ends the current path.
    pub is_goal_reached: bool,
    pub goal_state: G,
}

/// Callbacks driving [`depth_first_traverse_edges`].
pub trait EdgeTraversal<E: GraphEdge> {
    type PathState: Clone;
    type GoalState;
    type Output;
    type Error;

    fn initial_path_state(&self) -> Self::PathState;

    fn initial_goal_state(&self) -> Self::GoalState;

    /// Decide whether `id` can extend the path ending in `path`.
    fn visit_edge(
        &mut self,
        id: EdgeId,
        graph: &Graph<E>,
        path: &Self::PathState,
        goal: &Self::GoalState,
    ) -> Result<EdgeVisit<Self::PathState>, Self::Error>;

    /// Called with the path state returned by a traversable visit.
    fn evaluate_goal(
        &mut self,
        id: EdgeId,
        graph: &Graph<E>,
        path: &Self::PathState,
        goal: Self::GoalState,
    ) -> GoalEvaluation<Self::GoalState>;

    fn show_results(&self, goal: Self::GoalState) -> Self::Output;
}

/// Explore every edge path from `start`, depth first.
///
/// Outgoing edges are explored in insertion order. An edge that is not
/// traversable is dropped; an edge that reaches the goal ends its path. An
/// error from `visit_edge` aborts the search.
///
/// Termination is up to the traversal: cyclic graphs are only finite to
/// search if `visit_edge` bounds how often an edge may repeat.
pub fn depth_first_traverse_edges<E, T>(
    traversal: &mut T,
    start: &str,
    graph: &Graph<E>,
) -> Result<T::Output, T::Error>
where
    E: GraphEdge,
    T: EdgeTraversal<E>,
{
    let mut goal = traversal.initial_goal_state();
    let mut stack = Vec::new();
    push_outgoing(&mut stack, graph, start, &traversal.initial_path_state());

    while let Some((id, path)) = stack.pop() {
        let visit = traversal.visit_edge(id, graph, &path, &goal)?;
        if !visit.is_traversable {
            continue;
        }

        let evaluation = traversal.evaluate_goal(id, graph, &visit.path_state, goal);
        goal = evaluation.goal_state;
        if !evaluation.is_goal_reached {
            push_outgoing(&mut stack, graph, graph.edge_target(id), &visit.path_state);
        }
    }

    Ok(traversal.show_results(goal))
}

fn push_outgoing<E: GraphEdge, P: Clone>(
    stack: &mut Vec<(EdgeId, P)>,
    graph: &Graph<E>,
    vertex: &str,
    path: &P,
) {
    for &id in graph.outgoing(vertex).iter().rev() {
        stack.push((id, path.clone()));
    }
}
