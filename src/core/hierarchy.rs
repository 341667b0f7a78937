//! Parent/child/leaf analysis of a control-state tree.

use super::history::HistoryTarget;
use super::state::{ControlState, NodeId, StateTree};
use std::collections::HashMap;

/// Adjacency and leaf-descendant lists for every control state.
///
/// A state is compound iff it has at least one child. Atomic states map to
/// empty lists in both tables.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StateHierarchy {
    adjacency: HashMap<ControlState, Vec<ControlState>>,
    leaf_descendants: HashMap<ControlState, Vec<ControlState>>,
}

/// Compute the adjacency and leaf-descendant lists of `tree`.
///
/// An empty tree yields empty tables.
///
/// # Example
///
/// ```rust
/// use chartwalk::core::analyze_state_tree;
/// use serde_json::json;
///
/// let tree = serde_json::from_value(json!({
///     "P": { "Q": { "q1": "", "q2": "" }, "p1": "" }
/// }))
/// .unwrap();
/// let hierarchy = analyze_state_tree(&tree);
///
/// assert_eq!(hierarchy.children("P"), ["Q", "p1"]);
/// assert_eq!(hierarchy.leaf_descendants("P"), ["q1", "q2", "p1"]);
/// assert!(hierarchy.is_atomic("q1"));
/// ```
pub fn analyze_state_tree(tree: &StateTree) -> StateHierarchy {
    let mut hierarchy = StateHierarchy::default();
    for id in tree.pre_order() {
        let name = tree.name(id).to_string();
        let children = tree
            .children(id)
            .iter()
            .map(|&child| tree.name(child).to_string())
            .collect();
        let mut leaves = Vec::new();
        collect_leaves(tree, id, &mut leaves);
        hierarchy.adjacency.insert(name.clone(), children);
        hierarchy.leaf_descendants.insert(name, leaves);
    }
    hierarchy
}

fn collect_leaves(tree: &StateTree, id: NodeId, leaves: &mut Vec<ControlState>) {
    for &child in tree.children(id) {
        if tree.children(child).is_empty() {
            leaves.push(tree.name(child).to_string());
        } else {
            collect_leaves(tree, child, leaves);
        }
    }
}

impl StateHierarchy {
    /// Direct children of `state`; empty for atomic or unknown states.
    pub fn children(&self, state: &str) -> &[ControlState] {
        self.adjacency.get(state).map_or(&[], Vec::as_slice)
    }

    /// Atomic descendants of `state` in pre-order; empty for atomic states.
    pub fn leaf_descendants(&self, state: &str) -> &[ControlState] {
        self.leaf_descendants.get(state).map_or(&[], Vec::as_slice)
    }

    pub fn is_compound(&self, state: &str) -> bool {
        !self.children(state).is_empty()
    }

    pub fn is_atomic(&self, state: &str) -> bool {
        !self.is_compound(state)
    }

    /// Every state a history target may resolve to: the direct children of
    /// the history parent for shallow history, its leaves for deep history.
    pub fn trace_set(&self, target: &HistoryTarget) -> &[ControlState] {
        match target {
            HistoryTarget::Shallow(parent) => self.children(parent),
            HistoryTarget::Deep(parent) => self.leaf_descendants(parent),
        }
    }

    pub fn adjacency(&self) -> &HashMap<ControlState, Vec<ControlState>> {
        &self.adjacency
    }

    pub fn leaf_descendant_lists(&self) -> &HashMap<ControlState, Vec<ControlState>> {
        &self.leaf_descendants
    }
}
