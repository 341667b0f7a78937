//! Control-state tree for hierarchical state machines.
//!
//! The tree is stored as an arena of named nodes with parent/children
//! indices. Top-level states hang off a synthetic root which is never a
//! node of the arena: that root is what [`INIT_STATE`] stands for.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Name of a control state.
pub type ControlState = String;

/// Synthetic initial control state, above every configured state.
pub const INIT_STATE: &str = "nok";

/// Event fired automatically when a compound state is entered.
pub const INIT_EVENT: &str = "init";

/// Returns true if `state` is the synthetic initial state.
pub fn is_init_state(state: &str) -> bool {
    state == INIT_STATE
}

/// Classification of a transition's event label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind<'a> {
    /// The automatic `init` event.
    Init,
    /// No event: the transition fires on its own.
    Eventless,
    /// Any other, externally supplied event.
    Normal(&'a str),
}

impl<'a> EventKind<'a> {
    pub fn classify(event: Option<&'a str>) -> Self {
        match event {
            None => Self::Eventless,
            Some(INIT_EVENT) => Self::Init,
            Some(label) => Self::Normal(label),
        }
    }
}

/// Human-readable label for an optional event, used in logs and errors.
pub fn event_label(event: Option<&str>) -> String {
    event.map_or_else(|| "<eventless>".to_string(), str::to_string)
}

/// Index of a node in a [`StateTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Clone, Debug, PartialEq)]
struct StateNode {
    name: ControlState,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Tree of nested control states.
///
/// Serializes to and from the nested-object form where an atomic state maps
/// to `""` and a compound state maps to an object of its children:
///
/// ```rust
/// use chartwalk::core::StateTree;
/// use serde_json::json;
///
/// let tree: StateTree = serde_json::from_value(json!({
///     "OUTER": { "INNER": { "inner_s": "", "inner_t": "" }, "outer_a": "" },
///     "z": ""
/// }))
/// .unwrap();
///
/// assert_eq!(tree.len(), 6);
/// assert_eq!(tree.parent_of("inner_s"), Some("INNER"));
/// assert_eq!(tree.parent_of("z"), None);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct StateTree {
    nodes: Vec<StateNode>,
    roots: Vec<NodeId>,
}

impl StateTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level state (a child of the synthetic root).
    pub fn add_root(&mut self, name: impl Into<ControlState>) -> NodeId {
        let id = self.push_node(name.into(), None);
        self.roots.push(id);
        id
    }

    /// Add a child under `parent`.
    pub fn add_child(&mut self, parent: NodeId, name: impl Into<ControlState>) -> NodeId {
        let id = self.push_node(name.into(), Some(parent));
        self.nodes[parent.0].children.push(id);
        id
    }

    fn push_node(&mut self, name: ControlState, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(StateNode {
            name,
            parent,
            children: Vec::new(),
        });
        id
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.nodes[id.0].name
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Find a state by name. Names are expected to be unique in the tree.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.name == name)
            .map(NodeId)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Name of the direct parent of `name`, `None` for top-level or unknown states.
    pub fn parent_of(&self, name: &str) -> Option<&str> {
        self.find(name)
            .and_then(|id| self.parent(id))
            .map(|parent| self.name(parent))
    }

    /// Pre-order listing of every node.
    pub fn pre_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        order
    }

    /// Pre-order listing of every state name.
    pub fn state_names(&self) -> Vec<ControlState> {
        self.pre_order()
            .into_iter()
            .map(|id| self.name(id).to_string())
            .collect()
    }

    fn to_value(&self, ids: &[NodeId]) -> Value {
        let mut map = Map::new();
        for &id in ids {
            let children = self.children(id);
            let value = if children.is_empty() {
                Value::String(String::new())
            } else {
                self.to_value(children)
            };
            map.insert(self.name(id).to_string(), value);
        }
        Value::Object(map)
    }

    fn insert_value(
        &mut self,
        parent: Option<NodeId>,
        name: &str,
        value: &Value,
    ) -> Result<(), StateTreeFormatError> {
        let id = match parent {
            Some(parent) => self.add_child(parent, name),
            None => self.add_root(name),
        };
        match value {
            Value::Object(children) => {
                for (child, child_value) in children {
                    self.insert_value(Some(id), child, child_value)?;
                }
                Ok(())
            }
            Value::String(_) | Value::Null => Ok(()),
            _ => Err(StateTreeFormatError {
                state: name.to_string(),
            }),
        }
    }
}

/// A state tree value was neither an object nor an atomic marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTreeFormatError {
    pub state: String,
}

impl fmt::Display for StateTreeFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "state '{}' must map to \"\" (atomic) or an object of substates (compound)",
            self.state
        )
    }
}

impl std::error::Error for StateTreeFormatError {}

impl TryFrom<Value> for StateTree {
    type Error = StateTreeFormatError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let mut tree = StateTree::new();
        match &value {
            Value::Object(states) => {
                for (name, child) in states {
                    tree.insert_value(None, name, child)?;
                }
                Ok(tree)
            }
            _ => Err(StateTreeFormatError {
                state: INIT_STATE.to_string(),
            }),
        }
    }
}

impl From<StateTree> for Value {
    fn from(tree: StateTree) -> Self {
        tree.to_value(&tree.roots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nested() -> StateTree {
        serde_json::from_value(json!({
            "OUTER": { "INNER": { "inner_s": "", "inner_t": "" }, "outer_a": "", "outer_b": "" },
            "z": ""
        }))
        .unwrap()
    }

    #[test]
    fn parses_nested_object_form() {
        let tree = nested();
        assert_eq!(tree.len(), 7);
        assert_eq!(tree.roots().len(), 2);
        assert_eq!(tree.parent_of("INNER"), Some("OUTER"));
        assert_eq!(tree.parent_of("OUTER"), None);
    }

    #[test]
    fn pre_order_keeps_sibling_order() {
        assert_eq!(
            nested().state_names(),
            vec!["OUTER", "INNER", "inner_s", "inner_t", "outer_a", "outer_b", "z"]
        );
    }

    #[test]
    fn serializes_back_to_nested_form() {
        let value = serde_json::to_value(nested()).unwrap();
        assert_eq!(value["OUTER"]["INNER"]["inner_t"], json!(""));
        assert_eq!(value["z"], json!(""));
    }

    #[test]
    fn rejects_non_object_children() {
        let result: Result<StateTree, _> = serde_json::from_value(json!({ "A": 3 }));
        assert!(result.is_err());
    }

    #[test]
    fn empty_object_is_empty_tree() {
        let tree: StateTree = serde_json::from_value(json!({})).unwrap();
        assert!(tree.is_empty());
        assert!(tree.pre_order().is_empty());
    }

    #[test]
    fn builds_programmatically() {
        let mut tree = StateTree::new();
        let outer = tree.add_root("OUTER");
        tree.add_child(outer, "a");
        tree.add_root("z");

        assert_eq!(tree.state_names(), vec!["OUTER", "a", "z"]);
        assert!(tree.contains("a"));
        assert!(!tree.contains(INIT_STATE));
    }

    #[test]
    fn event_kind_classification() {
        assert_eq!(EventKind::classify(None), EventKind::Eventless);
        assert_eq!(EventKind::classify(Some(INIT_EVENT)), EventKind::Init);
        assert_eq!(EventKind::classify(Some("ev")), EventKind::Normal("ev"));
        assert_eq!(event_label(None), "<eventless>");
    }
}
