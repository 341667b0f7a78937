//! Reference interpreter for hierarchical machine definitions.

use crate::builder::{Branch, FsmDefinition, Target};
use crate::core::{
    analyze_state_tree, is_init_state, ControlState, History, StateHierarchy, INIT_EVENT,
    INIT_STATE, NO_OUTPUT,
};
use crate::engine::error::EngineError;
use crate::engine::machine::{ExecutionEngine, InputEvent, MachineInstance, StepOutput};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::{trace, warn};

/// Settings of the reference interpreter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterSettings {
    /// Upper bound on eventless transitions fired in a row after one input.
    pub max_eventless_steps: usize,
}

impl Default for InterpreterSettings {
    fn default() -> Self {
        Self {
            max_eventless_steps: 100,
        }
    }
}

/// Executes machine definitions.
///
/// Events are handled by the innermost active state that has an enabled
/// branch for them. Entering a compound state follows its `init`
/// transition; history targets resolve to the recorded state, or to the
/// history parent itself when nothing was recorded yet. Extended-state
/// updates overwrite top-level keys.
///
/// # Example
///
/// ```rust
/// use chartwalk::builder::{initial_transition, simple_transition, FsmDefinition};
/// use chartwalk::engine::{ExecutionEngine, InputEvent, Interpreter};
/// use serde_json::{json, Value};
///
/// let fsm = FsmDefinition::builder()
///     .states(serde_json::from_value(json!({ "A": "", "B": "" })).unwrap())
///     .add_transition(initial_transition("A"))
///     .add_transition(simple_transition("A", Some("go"), "B"))
///     .build()
///     .unwrap();
///
/// let mut machine = Interpreter::new().create(&fsm).unwrap();
/// machine.start().unwrap();
/// let steps = machine.send(&InputEvent::new("go", Value::Null)).unwrap();
///
/// assert_eq!(steps.len(), 1);
/// assert_eq!(steps[0].target_control_state, "B");
/// ```
#[derive(Clone, Debug, Default)]
pub struct Interpreter {
    settings: InterpreterSettings,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: InterpreterSettings) -> Self {
        Self { settings }
    }
}

impl ExecutionEngine for Interpreter {
    fn create<'a>(
        &self,
        fsm: &'a FsmDefinition,
    ) -> Result<Box<dyn MachineInstance + 'a>, EngineError> {
        Ok(Box::new(RunningMachine::new(fsm, self.settings.clone())))
    }
}

struct RunningMachine<'a> {
    fsm: &'a FsmDefinition,
    hierarchy: StateHierarchy,
    parents: HashMap<ControlState, ControlState>,
    settings: InterpreterSettings,
    current: Option<ControlState>,
    extended_state: Value,
    history: History,
}

impl<'a> RunningMachine<'a> {
    fn new(fsm: &'a FsmDefinition, settings: InterpreterSettings) -> Self {
        let hierarchy = analyze_state_tree(fsm.states());
        let parents = hierarchy
            .adjacency()
            .iter()
            .flat_map(|(parent, children)| {
                children
                    .iter()
                    .map(move |child| (child.clone(), parent.clone()))
            })
            .collect();

        Self {
            fsm,
            hierarchy,
            parents,
            settings,
            current: None,
            extended_state: fsm.initial_extended_state().clone(),
            history: History::default(),
        }
    }

    /// `[state, parent, grandparent, ...]`
    fn ancestry(&self, state: &str) -> Vec<ControlState> {
        let mut chain = vec![state.to_string()];
        let mut current = state;
        while let Some(parent) = self.parents.get(current) {
            chain.push(parent.clone());
            current = parent;
        }
        chain
    }

    fn enabled_branch(&self, from: &str, event: Option<&str>, data: &Value) -> Option<&'a Branch> {
        let fsm = self.fsm;
        fsm.transitions()
            .iter()
            .filter(|transition| transition.from_state() == from && transition.event() == event)
            .flat_map(|transition| transition.branches())
            .find(|branch| branch.is_enabled(&self.extended_state, data))
    }

    /// First enabled branch for `event`, searching from `state` outwards.
    fn find_branch(&self, state: &str, event: Option<&str>, data: &Value) -> Option<&'a Branch> {
        self.ancestry(state)
            .iter()
            .find_map(|candidate| self.enabled_branch(candidate, event, data))
    }

    fn apply(&mut self, updates: Map<String, Value>) {
        match &mut self.extended_state {
            Value::Object(state) => state.extend(updates),
            other => {
                if !updates.is_empty() {
                    *other = Value::Object(updates);
                }
            }
        }
    }

    fn resolve_target(&self, target: &Target) -> ControlState {
        match target {
            Target::State(state) => state.clone(),
            Target::History(history) => self
                .history
                .get(history.kind(), history.parent())
                .unwrap_or(history.parent())
                .to_string(),
        }
    }

    /// Follow `init` transitions until an atomic state is reached.
    fn descend(&mut self, mut state: ControlState, data: &Value) -> Result<ControlState, EngineError> {
        while self.hierarchy.is_compound(&state) {
            let branch = self
                .enabled_branch(&state, Some(INIT_EVENT), data)
                .ok_or_else(|| EngineError::NoInitialTransition {
                    state: state.clone(),
                })?;
            let result = branch.action_fn().run(&self.extended_state, data);
            self.apply(result.updates);
            state = self.resolve_target(branch.target());
        }
        Ok(state)
    }

    fn fire(&mut self, branch: &'a Branch, data: &Value) -> Result<StepOutput, EngineError> {
        let before = self.extended_state.clone();
        let result = branch.action_fn().run(&self.extended_state, data);

        let exited = match self.current.as_deref() {
            Some(current) if !is_init_state(current) => Some(self.ancestry(current)),
            _ => None,
        };
        if let Some(chain) = exited {
            self.history.record_leaf_exit(&chain);
        }

        self.apply(result.updates);
        let entered = self.resolve_target(branch.target());
        let settled = self.descend(entered, data)?;
        trace!(from = ?self.current, to = %settled, "Fired transition");
        self.current = Some(settled.clone());

        Ok(StepOutput {
            outputs: result.outputs,
            extended_state: before,
            new_extended_state: self.extended_state.clone(),
            target_control_state: settled,
        })
    }

    /// Run eventless transitions after `first` until none is enabled.
    fn settle(&mut self, first: StepOutput) -> Result<Vec<StepOutput>, EngineError> {
        let limit = self.settings.max_eventless_steps;
        let mut steps = vec![first];
        let mut fired = 0;

        while let Some(current) = self.current.clone() {
            let Some(branch) = self.find_branch(&current, None, &NO_OUTPUT) else {
                break;
            };
            if fired == limit {
                return Err(EngineError::EventlessLoop {
                    state: current,
                    limit,
                });
            }
            fired += 1;
            steps.push(self.fire(branch, &NO_OUTPUT)?);
        }
        Ok(steps)
    }
}

impl MachineInstance for RunningMachine<'_> {
    fn start(&mut self) -> Result<Vec<StepOutput>, EngineError> {
        if self.current.is_some() {
            return Err(EngineError::AlreadyStarted);
        }
        self.current = Some(INIT_STATE.to_string());

        let data = self.extended_state.clone();
        let branch = self
            .find_branch(INIT_STATE, Some(INIT_EVENT), &data)
            .ok_or_else(|| EngineError::NoInitialTransition {
                state: INIT_STATE.to_string(),
            })?;
        let step = self.fire(branch, &data)?;
        self.settle(step)
    }

    fn send(&mut self, input: &InputEvent) -> Result<Vec<StepOutput>, EngineError> {
        let current = self.current.clone().ok_or(EngineError::NotStarted)?;

        match self.find_branch(&current, Some(&input.event), &input.data) {
            Some(branch) => {
                let step = self.fire(branch, &input.data)?;
                self.settle(step)
            }
            None => {
                warn!(state = %current, event = %input.event, "Input not accepted");
                Ok(Vec::new())
            }
        }
    }
}
