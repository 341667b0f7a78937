//! Search strategies: which edges to follow and when a path is complete.

use super::sequences::{PathTraversalState, TestCase};
use crate::core::ControlState;
use crate::graph::{Edge, EdgeId, FsmGraph};
use serde::{Deserialize, Serialize};

/// Everything a strategy may look at when judging an edge.
#[derive(Clone, Copy, Debug)]
pub struct EdgeContext<'a> {
    pub id: EdgeId,
    pub graph: &'a FsmGraph,
    /// Path state before the edge for traversability, after it for goals.
    pub path: &'a PathTraversalState,
    /// Test cases found so far.
    pub results: &'a [TestCase],
}

impl<'a> EdgeContext<'a> {
    pub fn edge(&self) -> &'a Edge {
        self.graph.edge(self.id)
    }
}

/// Decides how far the search goes.
///
/// Edges that only descend into compound states through `init` are always
/// followed; the strategy is not asked about them.
pub trait Strategy {
    fn is_traversable_edge(&self, context: &EdgeContext<'_>) -> bool;

    fn is_goal_reached(&self, context: &EdgeContext<'_>) -> bool;
}

/// How many times `edge` already appears in `path`.
pub fn times_circled_on(path: &[EdgeId], edge: EdgeId) -> usize {
    path.iter().filter(|&&id| id == edge).count()
}

/// Every path to `target_vertex` taking each edge at most once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllTransitions {
    pub target_vertex: ControlState,
}

impl Strategy for AllTransitions {
    fn is_traversable_edge(&self, context: &EdgeContext<'_>) -> bool {
        times_circled_on(&context.path.path, context.id) < 1
    }

    fn is_goal_reached(&self, context: &EdgeContext<'_>) -> bool {
        context.edge().to() == self.target_vertex
    }
}

/// Every path to `target_vertex` taking each edge at most
/// `max_number_of_traversals` times.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllNTransitions {
    pub target_vertex: ControlState,
    pub max_number_of_traversals: usize,
}

impl Strategy for AllNTransitions {
    fn is_traversable_edge(&self, context: &EdgeContext<'_>) -> bool {
        times_circled_on(&context.path.path, context.id) < self.max_number_of_traversals.max(1)
    }

    fn is_goal_reached(&self, context: &EdgeContext<'_>) -> bool {
        context.edge().to() == self.target_vertex
    }
}

/// Strategy built from two closures.
pub struct FnStrategy<T, G> {
    is_traversable: T,
    is_goal: G,
}

impl<T, G> FnStrategy<T, G>
where
    T: Fn(&EdgeContext<'_>) -> bool,
    G: Fn(&EdgeContext<'_>) -> bool,
{
    pub fn new(is_traversable: T, is_goal: G) -> Self {
        Self {
            is_traversable,
            is_goal,
        }
    }
}

impl<T, G> Strategy for FnStrategy<T, G>
where
    T: Fn(&EdgeContext<'_>) -> bool,
    G: Fn(&EdgeContext<'_>) -> bool,
{
    fn is_traversable_edge(&self, context: &EdgeContext<'_>) -> bool {
        (self.is_traversable)(context)
    }

    fn is_goal_reached(&self, context: &EdgeContext<'_>) -> bool {
        (self.is_goal)(context)
    }
}

/// Built-in strategies, loadable from configuration.
///
/// ```rust
/// use chartwalk::generation::StrategyConfig;
/// use serde_json::json;
///
/// let strategy: StrategyConfig = serde_json::from_value(json!({
///     "kind": "all_n_transitions",
///     "target_vertex": "E",
///     "max_number_of_traversals": 2
/// }))
/// .unwrap();
///
/// assert!(matches!(strategy, StrategyConfig::AllNTransitions(_)));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyConfig {
    AllTransitions(AllTransitions),
    AllNTransitions(AllNTransitions),
}

impl Strategy for StrategyConfig {
    fn is_traversable_edge(&self, context: &EdgeContext<'_>) -> bool {
        match self {
            Self::AllTransitions(strategy) => strategy.is_traversable_edge(context),
            Self::AllNTransitions(strategy) => strategy.is_traversable_edge(context),
        }
    }

    fn is_goal_reached(&self, context: &EdgeContext<'_>) -> bool {
        match self {
            Self::AllTransitions(strategy) => strategy.is_goal_reached(context),
            Self::AllNTransitions(strategy) => strategy.is_goal_reached(context),
        }
    }
}

impl<S: Strategy + ?Sized> Strategy for &S {
    fn is_traversable_edge(&self, context: &EdgeContext<'_>) -> bool {
        (**self).is_traversable_edge(context)
    }

    fn is_goal_reached(&self, context: &EdgeContext<'_>) -> bool {
        (**self).is_goal_reached(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{initial_transition, simple_transition, FsmDefinition};
    use crate::graph::build_graph;
    use serde_json::json;

    fn graph() -> FsmGraph {
        let fsm = FsmDefinition::builder()
            .states(serde_json::from_value(json!({ "A": "", "B": "" })).unwrap())
            .add_transition(initial_transition("A"))
            .add_transition(simple_transition("A", Some("ev"), "B"))
            .add_transition(simple_transition("B", Some("ev"), "A"))
            .build()
            .unwrap();
        build_graph(&fsm)
    }

    fn ids(graph: &FsmGraph) -> Vec<EdgeId> {
        graph.edge_ids().collect()
    }

    fn path_through(edges: &[EdgeId]) -> PathTraversalState {
        PathTraversalState {
            path: edges.to_vec(),
            ..PathTraversalState::default()
        }
    }

    #[test]
    fn times_circled_on_counts_occurrences() {
        let graph = graph();
        let e = ids(&graph);
        assert_eq!(times_circled_on(&[e[0], e[1], e[2], e[1]], e[1]), 2);
        assert_eq!(times_circled_on(&[e[0]], e[2]), 0);
    }

    #[test]
    fn all_transitions_takes_each_edge_once() {
        let graph = graph();
        let e = ids(&graph);
        let strategy = AllTransitions {
            target_vertex: "B".into(),
        };
        let path = path_through(&[e[0], e[1], e[2]]);

        let again = EdgeContext {
            id: e[1],
            graph: &graph,
            path: &path,
            results: &[],
        };
        assert!(!strategy.is_traversable_edge(&again));
        assert!(strategy.is_goal_reached(&again));

        let back = EdgeContext { id: e[2], ..again };
        assert!(!strategy.is_goal_reached(&back));
    }

    #[test]
    fn all_n_transitions_allows_repeats() {
        let graph = graph();
        let e = ids(&graph);
        let strategy = AllNTransitions {
            target_vertex: "B".into(),
            max_number_of_traversals: 2,
        };
        let once = path_through(&[e[0], e[1], e[2]]);
        let twice = path_through(&[e[0], e[1], e[2], e[1], e[2]]);

        let context = |path| EdgeContext {
            id: e[1],
            graph: &graph,
            path,
            results: &[],
        };
        assert!(strategy.is_traversable_edge(&context(&once)));
        assert!(!strategy.is_traversable_edge(&context(&twice)));
    }

    #[test]
    fn fn_strategy_delegates_to_closures() {
        let graph = graph();
        let path = PathTraversalState::default();
        let strategy = FnStrategy::new(|_: &EdgeContext<'_>| false, |c: &EdgeContext<'_>| c.edge().to() == "A");
        let context = EdgeContext {
            id: ids(&graph)[0],
            graph: &graph,
            path: &path,
            results: &[],
        };

        assert!(!strategy.is_traversable_edge(&context));
        assert!(strategy.is_goal_reached(&context));
    }

    #[test]
    fn strategy_config_round_trips_through_json() {
        let config = StrategyConfig::AllTransitions(AllTransitions {
            target_vertex: "B".into(),
        });
        let value = serde_json::to_value(&config).unwrap();

        assert_eq!(value, json!({ "kind": "all_transitions", "target_vertex": "B" }));
        assert_eq!(serde_json::from_value::<StrategyConfig>(value).unwrap(), config);
    }
}
