//! Seam between test generation and the machine under test.

use crate::builder::FsmDefinition;
use crate::core::ControlState;
use crate::engine::error::EngineError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// An input sent to a machine: an event label and the data it carries.
///
/// Serializes as a single-key object, `{"event": data}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct InputEvent {
    pub event: String,
    pub data: Value,
}

impl InputEvent {
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }
}

/// An input event object did not have exactly one key.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("input event must be an object with exactly one key, found {0}")]
pub struct InputEventFormatError(pub usize);

impl TryFrom<Map<String, Value>> for InputEvent {
    type Error = InputEventFormatError;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        if map.len() != 1 {
            return Err(InputEventFormatError(map.len()));
        }
        let mut entries = map.into_iter();
        match entries.next() {
            Some((event, data)) => Ok(Self { event, data }),
            None => Err(InputEventFormatError(0)),
        }
    }
}

impl From<InputEvent> for Map<String, Value> {
    fn from(input: InputEvent) -> Self {
        let mut map = Map::new();
        map.insert(input.event, input.data);
        map
    }
}

/// What one fired transition produced.
///
/// `extended_state` is the extended state before the transition,
/// `new_extended_state` the one after it. `target_control_state` is the
/// atomic state the machine settled in, after any automatic init descent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepOutput {
    pub outputs: Value,
    pub extended_state: Value,
    pub new_extended_state: Value,
    pub target_control_state: ControlState,
}

/// A live, stateful machine.
///
/// Both methods return one [`StepOutput`] per fired transition: the first for
/// the transition triggered by the input (or the initial transition, for
/// `start`), followed by one per eventless transition that fired after it.
/// An input the machine does not accept yields an empty list.
pub trait MachineInstance {
    /// Leave the initial state and settle.
    fn start(&mut self) -> Result<Vec<StepOutput>, EngineError>;

    /// Process one input and settle.
    fn send(&mut self, input: &InputEvent) -> Result<Vec<StepOutput>, EngineError>;
}

/// Creates fresh machine instances from a definition.
///
/// Test generation creates one instance per visited edge and replays the
/// inputs of the path so far, so instances must be independent.
pub trait ExecutionEngine {
    fn create<'a>(
        &self,
        fsm: &'a FsmDefinition,
    ) -> Result<Box<dyn MachineInstance + 'a>, EngineError>;
}
