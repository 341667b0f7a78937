//! Graph of a machine definition and depth-first search over its edges.
//!
//! [`Graph`] and [`depth_first_traverse_edges`] know nothing about state
//! machines. [`build_graph`] lowers a hierarchical definition into a
//! [`Graph`] of [`Edge`]s.

mod edge;
mod lowering;
mod structure;
mod traversal;

pub use edge::{Edge, EdgeSpec};
pub use lowering::{build_graph, FsmGraph};
pub use structure::{EdgeId, Graph, GraphEdge};
pub use traversal::{depth_first_traverse_edges, EdgeTraversal, EdgeVisit, GoalEvaluation};
