//! Machine definitions and their builder.

use crate::builder::error::BuildError;
use crate::builder::transition::{Transition, TransitionBuilder};
use crate::builder::validation::validate_definition;
use crate::core::StateTree;
use serde_json::Value;
use stillwater::validation::Validation;

/// A hierarchical machine: control-state tree, transitions, initial extended state.
///
/// Built and validated by [`FsmBuilder`]; read-only afterwards.
#[derive(Clone, Debug)]
pub struct FsmDefinition {
    states: StateTree,
    transitions: Vec<Transition>,
    initial_extended_state: Value,
}

impl FsmDefinition {
    pub fn builder() -> FsmBuilder {
        FsmBuilder::new()
    }

    pub fn states(&self) -> &StateTree {
        &self.states
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn initial_extended_state(&self) -> &Value {
        &self.initial_extended_state
    }
}

/// Builder for machine definitions with a fluent API.
#[derive(Debug, Default)]
pub struct FsmBuilder {
    states: StateTree,
    transitions: Vec<Transition>,
    initial_extended_state: Option<Value>,
}

impl FsmBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the control-state tree.
    pub fn states(mut self, states: StateTree) -> Self {
        self.states = states;
        self
    }

    /// Set the initial extended state. Defaults to an empty object.
    pub fn initial_extended_state(mut self, state: Value) -> Self {
        self.initial_extended_state = Some(state);
        self
    }

    /// Add a transition using a builder.
    /// Returns an error if the builder fails validation.
    pub fn transition(mut self, builder: TransitionBuilder) -> Result<Self, BuildError> {
        let transition = builder.build()?;
        self.transitions.push(transition);
        Ok(self)
    }

    /// Add a pre-built transition.
    pub fn add_transition(mut self, transition: Transition) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Add multiple transitions at once.
    pub fn transitions(mut self, transitions: Vec<Transition>) -> Self {
        self.transitions.extend(transitions);
        self
    }

    /// Validate and build the definition, reporting every issue found.
    pub fn build(self) -> Result<FsmDefinition, BuildError> {
        match validate_definition(&self.states, &self.transitions) {
            Validation::Success(()) => Ok(FsmDefinition {
                states: self.states,
                transitions: self.transitions,
                initial_extended_state: self
                    .initial_extended_state
                    .unwrap_or_else(|| Value::Object(Default::default())),
            }),
            Validation::Failure(issues) => Err(BuildError::InvalidDefinition(
                issues.iter().cloned().collect(),
            )),
        }
    }
}
