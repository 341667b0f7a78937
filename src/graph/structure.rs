//! Directed multigraph over named vertices.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;

/// Index of an edge in a [`Graph`].
pub type EdgeId = petgraph::graph::EdgeIndex;

/// Anything that can be stored as an edge: it knows its endpoints.
pub trait GraphEdge {
    fn origin(&self) -> &str;
    fn target(&self) -> &str;
}

/// Directed graph with parallel edges allowed.
///
/// Outgoing edges of a vertex are listed in insertion order; traversals rely
/// on that order.
#[derive(Clone, Debug)]
pub struct Graph<E> {
    graph: DiGraph<String, E>,
    vertex_indices: HashMap<String, NodeIndex>,
}

impl<E: GraphEdge> Graph<E> {
    /// Endpoints missing from `vertices` are added after them.
    pub fn new(vertices: Vec<String>, edges: Vec<E>) -> Self {
        let mut graph = Self {
            graph: DiGraph::with_capacity(vertices.len(), edges.len()),
            vertex_indices: HashMap::new(),
        };
        for vertex in vertices {
            graph.add_vertex(&vertex);
        }
        for edge in edges {
            let from = graph.add_vertex(edge.origin());
            let to = graph.add_vertex(edge.target());
            graph.graph.add_edge(from, to, edge);
        }
        graph
    }

    fn add_vertex(&mut self, name: &str) -> NodeIndex {
        if let Some(&index) = self.vertex_indices.get(name) {
            return index;
        }
        let index = self.graph.add_node(name.to_string());
        self.vertex_indices.insert(name.to_string(), index);
        index
    }

    pub fn vertices(&self) -> impl ExactSizeIterator<Item = &str> {
        self.graph.raw_nodes().iter().map(|node| node.weight.as_str())
    }

    pub fn edges(&self) -> impl ExactSizeIterator<Item = &E> {
        self.graph.raw_edges().iter().map(|edge| &edge.weight)
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> {
        self.graph.edge_indices()
    }

    /// The edge behind `id`. Ids are only valid for the graph that issued them.
    pub fn edge(&self, id: EdgeId) -> &E {
        &self.graph[id]
    }

    pub fn edge_target(&self, id: EdgeId) -> &str {
        self.edge(id).target()
    }

    /// Edges leaving `vertex`, in insertion order.
    pub fn outgoing(&self, vertex: &str) -> Vec<EdgeId> {
        let Some(&node) = self.vertex_indices.get(vertex) else {
            return Vec::new();
        };
        let mut ids: Vec<EdgeId> = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .map(|edge| edge.id())
            .collect();
        ids.sort_unstable();
        ids
    }
}
