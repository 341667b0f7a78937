//! Input generators bound to transition branches.

use crate::builder::Target;
use crate::core::ControlState;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Result of running an input generator.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedInput {
    /// Event data for the input.
    pub input: Value,
    /// False when no input can trigger the branch from the current extended state.
    pub has_generated_input: bool,
    /// New generator state; `None` keeps the current one.
    pub generator_state: Option<Value>,
}

impl GeneratedInput {
    pub fn new(input: Value) -> Self {
        Self {
            input,
            has_generated_input: true,
            generator_state: None,
        }
    }

    /// No input can be generated.
    pub fn none() -> Self {
        Self {
            input: Value::Null,
            has_generated_input: false,
            generator_state: None,
        }
    }

    pub fn with_generator_state(mut self, state: Value) -> Self {
        self.generator_state = Some(state);
        self
    }
}

/// Computes event data from `(extended_state, generator_state)`.
#[derive(Clone)]
pub struct InputGenerator {
    generate: Arc<dyn Fn(&Value, &Value) -> GeneratedInput + Send + Sync>,
}

impl InputGenerator {
    pub fn new<F>(generate: F) -> Self
    where
        F: Fn(&Value, &Value) -> GeneratedInput + Send + Sync + 'static,
    {
        Self {
            generate: Arc::new(generate),
        }
    }

    /// Always generates `input`, leaving the generator state alone.
    pub fn constant(input: Value) -> Self {
        Self::new(move |_, _| GeneratedInput::new(input.clone()))
    }

    /// Never generates an input.
    pub fn never() -> Self {
        Self::new(|_, _| GeneratedInput::none())
    }

    pub fn generate(&self, extended_state: &Value, generator_state: &Value) -> GeneratedInput {
        (self.generate)(extended_state, generator_state)
    }
}

impl fmt::Debug for InputGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("InputGenerator(..)")
    }
}

/// Generator for one guard branch. `target` is informative only.
#[derive(Clone, Debug)]
pub struct GeneratorGuard {
    pub target: Option<Target>,
    pub generator: Option<InputGenerator>,
}

/// Generators of a transition, one per guard branch, in the transition's
/// guard order.
///
/// # Example
///
/// ```rust
/// use chartwalk::generation::{GeneratedInput, GeneratorTransition, InputGenerator};
///
/// let generators = GeneratorTransition::new("A", Some("ev"))
///     .without_generator("B")
///     .generator("B", InputGenerator::new(|x, _| GeneratedInput::new(x.clone())));
///
/// assert_eq!(generators.guards().len(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct GeneratorTransition {
    from: ControlState,
    event: Option<String>,
    guards: Vec<GeneratorGuard>,
}

impl GeneratorTransition {
    pub fn new(from: impl Into<ControlState>, event: Option<&str>) -> Self {
        Self {
            from: from.into(),
            event: event.map(str::to_string),
            guards: Vec::new(),
        }
    }

    /// Transition with a single, unguarded branch.
    pub fn single(
        from: impl Into<ControlState>,
        event: Option<&str>,
        to: impl Into<Target>,
        generator: InputGenerator,
    ) -> Self {
        Self::new(from, event).generator(to, generator)
    }

    /// Add the next guard branch, with its generator.
    pub fn generator(mut self, to: impl Into<Target>, generator: InputGenerator) -> Self {
        self.guards.push(GeneratorGuard {
            target: Some(to.into()),
            generator: Some(generator),
        });
        self
    }

    /// Add the next guard branch, which needs no generated input.
    pub fn without_generator(mut self, to: impl Into<Target>) -> Self {
        self.guards.push(GeneratorGuard {
            target: Some(to.into()),
            generator: None,
        });
        self
    }

    pub fn from_state(&self) -> &str {
        &self.from
    }

    pub fn event(&self) -> Option<&str> {
        self.event.as_deref()
    }

    pub fn guards(&self) -> &[GeneratorGuard] {
        &self.guards
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct GeneratorKey {
    from: ControlState,
    event: Option<String>,
    guard_index: usize,
}

/// Lookup from `(origin, event, guard index)` to the generator of that branch.
///
/// Generator transitions must list their guards in the same order as the
/// machine transitions they stand for.
#[derive(Clone, Debug, Default)]
pub struct GeneratorIndex {
    generators: HashMap<GeneratorKey, InputGenerator>,
}

impl GeneratorIndex {
    /// Index `transitions`. A later entry for the same branch wins.
    pub fn new(transitions: &[GeneratorTransition]) -> Self {
        let mut generators = HashMap::new();
        for transition in transitions {
            for (guard_index, guard) in transition.guards().iter().enumerate() {
                let Some(generator) = &guard.generator else {
                    continue;
                };
                let key = GeneratorKey {
                    from: transition.from.clone(),
                    event: transition.event.clone(),
                    guard_index,
                };
                generators.insert(key, generator.clone());
            }
        }
        Self { generators }
    }

    pub fn get(&self, from: &str, event: Option<&str>, guard_index: usize) -> Option<&InputGenerator> {
        let key = GeneratorKey {
            from: from.to_string(),
            event: event.map(str::to_string),
            guard_index,
        };
        self.generators.get(&key)
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn index_matches_exact_branch() {
        let index = GeneratorIndex::new(&[
            GeneratorTransition::new("A", Some("ev"))
                .generator("B", InputGenerator::never())
                .generator("C", InputGenerator::constant(json!(1))),
            GeneratorTransition::single("B", None, "C", InputGenerator::constant(json!(2))),
        ]);

        assert_eq!(index.len(), 3);
        let second = index.get("A", Some("ev"), 1).unwrap();
        assert_eq!(second.generate(&json!({}), &Value::Null).input, json!(1));
        assert!(index.get("A", Some("ev"), 2).is_none());
        assert!(index.get("A", Some("other"), 0).is_none());
        assert!(index.get("B", None, 0).is_some());
    }

    #[test]
    fn branches_without_generator_are_not_indexed() {
        let index = GeneratorIndex::new(&[GeneratorTransition::new("A", Some("ev"))
            .without_generator("B")
            .generator("C", InputGenerator::never())]);

        assert!(index.get("A", Some("ev"), 0).is_none());
        assert!(index.get("A", Some("ev"), 1).is_some());
    }

    #[test]
    fn generators_see_extended_and_generator_state() {
        let generator = InputGenerator::new(|x, g| {
            let n = g.as_i64().unwrap_or(0);
            GeneratedInput::new(x["key"].clone()).with_generator_state(json!(n + 1))
        });

        let generated = generator.generate(&json!({ "key": "v" }), &json!(4));
        assert_eq!(generated.input, json!("v"));
        assert!(generated.has_generated_input);
        assert_eq!(generated.generator_state, Some(json!(5)));
    }

    #[test]
    fn constant_and_never() {
        let constant = InputGenerator::constant(json!({ "a": 1 })).generate(&json!({}), &Value::Null);
        assert_eq!(constant, GeneratedInput::new(json!({ "a": 1 })));

        let never = InputGenerator::never().generate(&json!({}), &Value::Null);
        assert!(!never.has_generated_input);
    }
}
