//! Guard predicates and transition actions.
//!
//! Guards are pure boolean functions over the machine's extended state and
//! the data carried by the triggering event. Actions compute the outputs of a
//! transition and the updates it makes to the extended state.

use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Output value meaning "this transition produced no output".
pub const NO_OUTPUT: Value = Value::Null;

/// Pure predicate that determines if a transition branch can fire.
///
/// Guards are cheap to clone: the predicate is shared.
///
/// # Example
///
/// ```rust
/// use chartwalk::core::Guard;
/// use serde_json::json;
///
/// let is_reviewed = Guard::new(|extended_state, _event_data| {
///     extended_state["reviewed"] == json!(true)
/// });
///
/// assert!(is_reviewed.check(&json!({ "reviewed": true }), &json!(null)));
/// assert!(!is_reviewed.check(&json!({ "reviewed": false }), &json!(null)));
/// ```
#[derive(Clone)]
pub struct Guard {
    predicate: Arc<dyn Fn(&Value, &Value) -> bool + Send + Sync>,
}

impl Guard {
    /// Create a guard from a predicate over `(extended_state, event_data)`.
    ///
    /// The predicate must be deterministic and free of side effects.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
        }
    }

    /// Guard that always holds.
    pub fn always() -> Self {
        Self::new(|_, _| true)
    }

    /// Guard that never holds.
    pub fn never() -> Self {
        Self::new(|_, _| false)
    }

    pub fn check(&self, extended_state: &Value, event_data: &Value) -> bool {
        (self.predicate)(extended_state, event_data)
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard(..)")
    }
}

/// What an action produces: outputs, and top-level extended-state keys to overwrite.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActionResult {
    pub outputs: Value,
    pub updates: Map<String, Value>,
}

impl ActionResult {
    /// No output, no update.
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn output(outputs: Value) -> Self {
        Self {
            outputs,
            updates: Map::new(),
        }
    }

    pub fn with_update(mut self, key: impl Into<String>, value: Value) -> Self {
        self.updates.insert(key.into(), value);
        self
    }
}

/// Transition action over `(extended_state, event_data)`.
#[derive(Clone)]
pub struct Action {
    factory: Arc<dyn Fn(&Value, &Value) -> ActionResult + Send + Sync>,
}

impl Action {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&Value, &Value) -> ActionResult + Send + Sync + 'static,
    {
        Self {
            factory: Arc::new(factory),
        }
    }

    /// Action with no output and no update.
    pub fn identity() -> Self {
        Self::new(|_, _| ActionResult::identity())
    }

    pub fn run(&self, extended_state: &Value, event_data: &Value) -> ActionResult {
        (self.factory)(extended_state, event_data)
    }
}

impl Default for Action {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Action(..)")
    }
}
