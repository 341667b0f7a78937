//! History pseudostate tracking.
//!
//! History is derived from the sequence of control states a path has gone
//! through: every state in the sequence counts as exited once the path moves
//! past it, and exiting a state records it in the history of its ancestors.
//! The record is updated only on exit, never on entry.

use super::error::AnalysisError;
use super::state::{is_init_state, ControlState, NodeId, StateTree};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Flavour of a history pseudostate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    /// Last exited direct child.
    Shallow,
    /// Last exited atomic descendant.
    Deep,
}

/// A transition target naming the compound state whose history is the real target.
///
/// Serializes as `{"deep": "P"}` or `{"shallow": "P"}`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryTarget {
    Shallow(ControlState),
    Deep(ControlState),
}

impl HistoryTarget {
    pub fn kind(&self) -> HistoryKind {
        match self {
            Self::Shallow(_) => HistoryKind::Shallow,
            Self::Deep(_) => HistoryKind::Deep,
        }
    }

    /// The compound state whose history is looked up.
    pub fn parent(&self) -> &str {
        match self {
            Self::Shallow(parent) | Self::Deep(parent) => parent,
        }
    }
}

/// Ancestors of every control state, per history kind.
///
/// `shallow[s]` holds the direct parent of `s`; `deep[s]` holds every
/// ancestor from the parent outwards. The synthetic root is never listed, so
/// top-level states map to empty lists.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StateAncestors {
    pub shallow: HashMap<ControlState, Vec<ControlState>>,
    pub deep: HashMap<ControlState, Vec<ControlState>>,
}

impl StateAncestors {
    pub fn of(&self, kind: HistoryKind, state: &str) -> &[ControlState] {
        let table = match kind {
            HistoryKind::Shallow => &self.shallow,
            HistoryKind::Deep => &self.deep,
        };
        table.get(state).map_or(&[], Vec::as_slice)
    }
}

/// Result of [`compute_ancestors`].
#[derive(Clone, Debug, PartialEq)]
pub struct AncestorAnalysis {
    /// Every control state in pre-order, excluding the synthetic root.
    pub state_list: Vec<ControlState>,
    pub state_ancestors: StateAncestors,
}

/// Build the state list and ancestor tables of `tree`.
///
/// Fails with [`AnalysisError::EmptyStateTree`] when there is no state to analyze.
pub fn compute_ancestors(tree: &StateTree) -> Result<AncestorAnalysis, AnalysisError> {
    if tree.is_empty() {
        return Err(AnalysisError::EmptyStateTree);
    }

    let mut state_list = Vec::with_capacity(tree.len());
    let mut state_ancestors = StateAncestors::default();
    for id in tree.pre_order() {
        let name = tree.name(id).to_string();
        let ancestors = ancestor_names(tree, id);
        state_ancestors
            .shallow
            .insert(name.clone(), ancestors.iter().take(1).cloned().collect());
        state_ancestors.deep.insert(name.clone(), ancestors);
        state_list.push(name);
    }

    Ok(AncestorAnalysis {
        state_list,
        state_ancestors,
    })
}

fn ancestor_names(tree: &StateTree, id: NodeId) -> Vec<ControlState> {
    let mut ancestors = Vec::new();
    let mut current = tree.parent(id);
    while let Some(parent) = current {
        ancestors.push(tree.name(parent).to_string());
        current = tree.parent(parent);
    }
    ancestors
}

/// Last exited descendant of each compound state, per history kind.
///
/// A missing entry means the state has no history yet.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct History {
    shallow: HashMap<ControlState, Option<ControlState>>,
    deep: HashMap<ControlState, Option<ControlState>>,
}

impl History {
    /// Fresh history with no recorded state for any of `state_list`.
    pub fn new(state_list: &[ControlState]) -> Self {
        let empty = || -> HashMap<ControlState, Option<ControlState>> {
            state_list.iter().map(|state| (state.clone(), None)).collect()
        };
        Self {
            shallow: empty(),
            deep: empty(),
        }
    }

    /// Recorded history of `parent`, if any.
    pub fn get(&self, kind: HistoryKind, parent: &str) -> Option<&str> {
        self.table(kind)
            .get(parent)
            .and_then(|state| state.as_deref())
    }

    pub fn set(&mut self, kind: HistoryKind, parent: &str, state: &str) {
        let table = match kind {
            HistoryKind::Shallow => &mut self.shallow,
            HistoryKind::Deep => &mut self.deep,
        };
        table.insert(parent.to_string(), Some(state.to_string()));
    }

    fn table(&self, kind: HistoryKind) -> &HashMap<ControlState, Option<ControlState>> {
        match kind {
            HistoryKind::Shallow => &self.shallow,
            HistoryKind::Deep => &self.deep,
        }
    }

    /// Record that `exited` was exited: it becomes the history of each of its
    /// ancestors, for both kinds. Exiting the synthetic initial state is a no-op.
    pub fn update(&mut self, ancestors: &StateAncestors, exited: &str) -> &mut Self {
        if is_init_state(exited) {
            return self;
        }

        for kind in [HistoryKind::Shallow, HistoryKind::Deep] {
            for ancestor in ancestors.of(kind, exited) {
                self.set(kind, ancestor, exited);
            }
        }
        self
    }

    /// Record the exit of an atomic state given its ancestor chain
    /// `[leaf, parent, grandparent, ...]`.
    ///
    /// Every ancestor gets the leaf as deep history and the child lying on the
    /// chain as shallow history. This is the exit rule of a running machine,
    /// which leaves compound states through their active leaf.
    pub fn record_leaf_exit(&mut self, chain: &[ControlState]) {
        let Some(leaf) = chain.first() else {
            return;
        };
        for pair in chain.windows(2) {
            self.set(HistoryKind::Shallow, &pair[1], &pair[0]);
            self.set(HistoryKind::Deep, &pair[1], leaf);
        }
    }
}

/// Compute the history of `parent` after going through `control_state_sequence`.
///
/// Ancestor tables and history are rebuilt from scratch on every call.
///
/// # Example
///
/// ```rust
/// use chartwalk::core::{resolve_history, HistoryKind, INIT_STATE};
/// use serde_json::json;
///
/// let tree = serde_json::from_value(json!({
///     "OUTER": { "INNER": { "inner_s": "", "inner_t": "" }, "outer_a": "" },
///     "z": ""
/// }))
/// .unwrap();
/// let sequence: Vec<String> = [INIT_STATE, "OUTER", "outer_a", "INNER", "inner_s", "z"]
///     .iter()
///     .map(|s| s.to_string())
///     .collect();
///
/// let shallow = resolve_history(&tree, &sequence, HistoryKind::Shallow, "OUTER").unwrap();
/// let deep = resolve_history(&tree, &sequence, HistoryKind::Deep, "OUTER").unwrap();
///
/// assert_eq!(shallow.as_deref(), Some("INNER"));
/// assert_eq!(deep.as_deref(), Some("inner_s"));
/// ```
pub fn resolve_history(
    tree: &StateTree,
    control_state_sequence: &[ControlState],
    kind: HistoryKind,
    parent: &str,
) -> Result<Option<ControlState>, AnalysisError> {
    let AncestorAnalysis {
        state_list,
        state_ancestors,
    } = compute_ancestors(tree)?;
    let history = control_state_sequence.iter().fold(
        History::new(&state_list),
        |mut history, state| {
            history.update(&state_ancestors, state);
            history
        },
    );

    Ok(history.get(kind, parent).map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::INIT_STATE;
    use serde_json::json;

    fn tree() -> StateTree {
        serde_json::from_value(json!({
            "OUTER": { "INNER": { "inner_s": "", "inner_t": "" }, "outer_a": "", "outer_b": "" },
            "z": ""
        }))
        .unwrap()
    }

    fn seq(states: &[&str]) -> Vec<ControlState> {
        states.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn ancestors_exclude_synthetic_root() {
        let analysis = compute_ancestors(&tree()).unwrap();
        let ancestors = &analysis.state_ancestors;

        assert_eq!(ancestors.of(HistoryKind::Shallow, "inner_s"), ["INNER"]);
        assert_eq!(ancestors.of(HistoryKind::Deep, "inner_s"), ["INNER", "OUTER"]);
        assert!(ancestors.of(HistoryKind::Shallow, "OUTER").is_empty());
        assert!(ancestors.of(HistoryKind::Deep, "z").is_empty());
    }

    #[test]
    fn state_list_is_pre_order() {
        let analysis = compute_ancestors(&tree()).unwrap();
        assert_eq!(
            analysis.state_list,
            seq(&["OUTER", "INNER", "inner_s", "inner_t", "outer_a", "outer_b", "z"])
        );
    }

    #[test]
    fn empty_tree_is_invalid_input() {
        let result = compute_ancestors(&StateTree::new());
        assert!(matches!(result, Err(AnalysisError::EmptyStateTree)));
    }

    #[test]
    fn new_history_is_empty_and_kinds_are_independent() {
        let states = seq(&["OUTER", "INNER"]);
        let mut history = History::new(&states);
        assert_eq!(history.get(HistoryKind::Deep, "OUTER"), None);

        history.set(HistoryKind::Deep, "OUTER", "INNER");
        assert_eq!(history.get(HistoryKind::Deep, "OUTER"), Some("INNER"));
        assert_eq!(history.get(HistoryKind::Shallow, "OUTER"), None);
    }

    #[test]
    fn update_ignores_init_state() {
        let analysis = compute_ancestors(&tree()).unwrap();
        let mut history = History::new(&analysis.state_list);
        let before = history.clone();

        history.update(&analysis.state_ancestors, INIT_STATE);

        assert_eq!(history, before);
    }

    #[test]
    fn update_sets_parent_for_shallow_and_all_ancestors_for_deep() {
        let analysis = compute_ancestors(&tree()).unwrap();
        let mut history = History::new(&analysis.state_list);

        history.update(&analysis.state_ancestors, "inner_t");

        assert_eq!(history.get(HistoryKind::Shallow, "INNER"), Some("inner_t"));
        assert_eq!(history.get(HistoryKind::Shallow, "OUTER"), None);
        assert_eq!(history.get(HistoryKind::Deep, "INNER"), Some("inner_t"));
        assert_eq!(history.get(HistoryKind::Deep, "OUTER"), Some("inner_t"));
    }

    #[test]
    fn resolve_returns_most_recent_exit() {
        let tree = tree();
        let sequence = seq(&[
            INIT_STATE, "OUTER", "outer_a", "INNER", "inner_s", "inner_t", "z",
        ]);

        let shallow = resolve_history(&tree, &sequence, HistoryKind::Shallow, "OUTER").unwrap();
        let deep = resolve_history(&tree, &sequence, HistoryKind::Deep, "OUTER").unwrap();
        let inner = resolve_history(&tree, &sequence, HistoryKind::Shallow, "INNER").unwrap();

        assert_eq!(shallow.as_deref(), Some("INNER"));
        assert_eq!(deep.as_deref(), Some("inner_t"));
        assert_eq!(inner.as_deref(), Some("inner_t"));
    }

    #[test]
    fn resolve_without_history_is_none() {
        let sequence = seq(&[INIT_STATE, "z"]);
        let resolved = resolve_history(&tree(), &sequence, HistoryKind::Deep, "OUTER").unwrap();
        assert_eq!(resolved, None);
    }

    #[test]
    fn leaf_exit_records_chain() {
        let mut history = History::default();
        history.record_leaf_exit(&seq(&["inner_s", "INNER", "OUTER"]));

        assert_eq!(history.get(HistoryKind::Shallow, "INNER"), Some("inner_s"));
        assert_eq!(history.get(HistoryKind::Shallow, "OUTER"), Some("INNER"));
        assert_eq!(history.get(HistoryKind::Deep, "OUTER"), Some("inner_s"));
    }

    #[test]
    fn history_target_serializes_as_tagged_object() {
        let target = HistoryTarget::Deep("OUTER".into());
        assert_eq!(serde_json::to_value(&target).unwrap(), json!({ "deep": "OUTER" }));

        let parsed: HistoryTarget = serde_json::from_value(json!({ "shallow": "P" })).unwrap();
        assert_eq!(parsed.kind(), HistoryKind::Shallow);
        assert_eq!(parsed.parent(), "P");
    }
}
