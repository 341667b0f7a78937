//! Transitions of a hierarchical machine and their builder.

use crate::builder::error::BuildError;
use crate::core::{Action, ActionResult, ControlState, Guard, HistoryTarget, INIT_EVENT};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a transition branch leads: a control state or a history pseudostate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Target {
    State(ControlState),
    History(HistoryTarget),
}

impl Target {
    pub fn shallow(parent: impl Into<ControlState>) -> Self {
        Self::History(HistoryTarget::Shallow(parent.into()))
    }

    pub fn deep(parent: impl Into<ControlState>) -> Self {
        Self::History(HistoryTarget::Deep(parent.into()))
    }

    pub fn as_state(&self) -> Option<&str> {
        match self {
            Self::State(state) => Some(state),
            Self::History(_) => None,
        }
    }

    pub fn as_history(&self) -> Option<&HistoryTarget> {
        match self {
            Self::State(_) => None,
            Self::History(history) => Some(history),
        }
    }
}

impl From<&str> for Target {
    fn from(state: &str) -> Self {
        Self::State(state.to_string())
    }
}

impl From<String> for Target {
    fn from(state: String) -> Self {
        Self::State(state)
    }
}

impl From<HistoryTarget> for Target {
    fn from(history: HistoryTarget) -> Self {
        Self::History(history)
    }
}

/// One guarded alternative of a transition.
#[derive(Clone, Debug)]
pub struct Branch {
    predicate: Option<Guard>,
    to: Target,
    action: Action,
}

impl Branch {
    /// Unconditional branch with the identity action.
    pub fn new(to: impl Into<Target>) -> Self {
        Self {
            predicate: None,
            to: to.into(),
            action: Action::identity(),
        }
    }

    /// Guard this branch with a predicate over `(extended_state, event_data)`.
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Guard::new(predicate));
        self
    }

    pub fn guard(mut self, guard: Guard) -> Self {
        self.predicate = Some(guard);
        self
    }

    pub fn action<F>(mut self, factory: F) -> Self
    where
        F: Fn(&Value, &Value) -> ActionResult + Send + Sync + 'static,
    {
        self.action = Action::new(factory);
        self
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    pub fn predicate(&self) -> Option<&Guard> {
        self.predicate.as_ref()
    }

    pub fn target(&self) -> &Target {
        &self.to
    }

    pub fn action_fn(&self) -> &Action {
        &self.action
    }

    /// Whether this branch may fire. A branch without predicate always may.
    pub fn is_enabled(&self, extended_state: &Value, event_data: &Value) -> bool {
        self.predicate
            .as_ref()
            .map_or(true, |guard| guard.check(extended_state, event_data))
    }
}

/// A configured transition: origin, optional event, and its guarded branches.
///
/// A transition without event is eventless. Branches are tried in order.
#[derive(Clone, Debug)]
pub struct Transition {
    from: ControlState,
    event: Option<String>,
    branches: Vec<Branch>,
}

impl Transition {
    pub fn from_state(&self) -> &str {
        &self.from
    }

    pub fn event(&self) -> Option<&str> {
        self.event.as_deref()
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn is_eventless(&self) -> bool {
        self.event.is_none()
    }
}

/// Builder for constructing transitions with a fluent API.
///
/// # Example
///
/// ```rust
/// use chartwalk::builder::{Branch, TransitionBuilder};
/// use serde_json::json;
///
/// let transition = TransitionBuilder::new()
///     .from("A")
///     .event("ev")
///     .branch(Branch::new("B").when(|x, _| x["ready"] == json!(false)))
///     .branch(Branch::new("C").when(|x, _| x["ready"] == json!(true)))
///     .build()
///     .unwrap();
///
/// assert_eq!(transition.branches().len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct TransitionBuilder {
    from: Option<ControlState>,
    event: Option<String>,
    to: Option<Target>,
    action: Option<Action>,
    branches: Vec<Branch>,
}

impl TransitionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the source state (required).
    pub fn from(mut self, state: impl Into<ControlState>) -> Self {
        self.from = Some(state.into());
        self
    }

    /// Set the triggering event. Leave unset for an eventless transition.
    pub fn event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    /// Trigger on the automatic init event.
    pub fn on_init(self) -> Self {
        self.event(INIT_EVENT)
    }

    /// Set an unconditional target.
    pub fn to(mut self, target: impl Into<Target>) -> Self {
        self.to = Some(target.into());
        self
    }

    /// Set the action of the unconditional target.
    pub fn action<F>(mut self, factory: F) -> Self
    where
        F: Fn(&Value, &Value) -> ActionResult + Send + Sync + 'static,
    {
        self.action = Some(Action::new(factory));
        self
    }

    /// Add a guarded branch.
    pub fn branch(mut self, branch: Branch) -> Self {
        self.branches.push(branch);
        self
    }

    pub fn build(self) -> Result<Transition, BuildError> {
        let from = self.from.ok_or(BuildError::MissingFromState)?;
        let branches = match (self.to, self.branches.is_empty()) {
            (Some(_), false) => return Err(BuildError::ConflictingTargets),
            (Some(to), true) => vec![Branch {
                predicate: None,
                to,
                action: self.action.unwrap_or_default(),
            }],
            (None, false) => self.branches,
            (None, true) => return Err(BuildError::MissingTarget),
        };

        Ok(Transition {
            from,
            event: self.event,
            branches,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NO_OUTPUT;
    use serde_json::json;

    #[test]
    fn builder_validates_required_fields() {
        let result = TransitionBuilder::new().to("B").build();
        assert!(matches!(result, Err(BuildError::MissingFromState)));

        let result = TransitionBuilder::new().from("A").event("ev").build();
        assert!(matches!(result, Err(BuildError::MissingTarget)));
    }

    #[test]
    fn builder_rejects_target_and_branches_together() {
        let result = TransitionBuilder::new()
            .from("A")
            .to("B")
            .branch(Branch::new("C"))
            .build();
        assert!(matches!(result, Err(BuildError::ConflictingTargets)));
    }

    #[test]
    fn unconditional_target_becomes_single_branch() {
        let transition = TransitionBuilder::new()
            .from("A")
            .event("ev")
            .to("B")
            .build()
            .unwrap();

        assert_eq!(transition.from_state(), "A");
        assert_eq!(transition.event(), Some("ev"));
        assert_eq!(transition.branches().len(), 1);
        let branch = &transition.branches()[0];
        assert!(branch.predicate().is_none());
        assert_eq!(branch.target(), &Target::from("B"));
        assert!(branch.is_enabled(&json!({}), &NO_OUTPUT));
    }

    #[test]
    fn on_init_sets_init_event() {
        let transition = TransitionBuilder::new()
            .from("P")
            .on_init()
            .to("p1")
            .build()
            .unwrap();
        assert_eq!(transition.event(), Some(INIT_EVENT));
        assert!(!transition.is_eventless());
    }

    #[test]
    fn missing_event_means_eventless() {
        let transition = TransitionBuilder::new().from("A").to("B").build().unwrap();
        assert!(transition.is_eventless());
    }

    #[test]
    fn branch_guard_is_evaluated() {
        let branch = Branch::new("B").when(|_, e| e["valid"] == json!(true));
        assert!(branch.is_enabled(&json!({}), &json!({ "valid": true })));
        assert!(!branch.is_enabled(&json!({}), &json!({ "valid": false })));
    }

    #[test]
    fn history_targets_parse_from_json() {
        let target: Target = serde_json::from_value(json!({ "deep": "OUTER" })).unwrap();
        assert_eq!(target, Target::deep("OUTER"));

        let target: Target = serde_json::from_value(json!("A")).unwrap();
        assert_eq!(target.as_state(), Some("A"));
    }
}
