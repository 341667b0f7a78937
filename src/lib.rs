//! Chartwalk: test sequence generation for hierarchical state machines
//!
//! Chartwalk takes a machine definition (a tree of control states, guarded
//! transitions, history pseudo-states and eventless transitions) together
//! with input generators, and produces test cases: input sequences with the
//! outputs and control states the machine is expected to go through.
//!
//! # Modules
//!
//! - [`core`]: state tree analysis, history, guards and actions
//! - [`builder`]: building and validating machine definitions
//! - [`engine`]: running a definition, input by input
//! - [`graph`]: flattening a definition into a graph and searching it
//! - [`generation`]: strategies, input generators and test generation
//!
//! # Example
//!
//! ```rust
//! use chartwalk::builder::{initial_transition, Branch, FsmDefinition, TransitionBuilder};
//! use chartwalk::core::ActionResult;
//! use chartwalk::engine::Interpreter;
//! use chartwalk::generation::{
//!     generate_test_sequences, AllTransitions, GeneratedInput, GenerationSettings,
//!     GeneratorTransition, InputGenerator,
//! };
//! use serde_json::json;
//!
//! let fsm = FsmDefinition::builder()
//!     .states(serde_json::from_value(json!({ "idle": "", "busy": "" })).unwrap())
//!     .initial_extended_state(json!({ "jobs": 0 }))
//!     .add_transition(initial_transition("idle"))
//!     .transition(
//!         TransitionBuilder::new().from("idle").event("submit").branch(
//!             Branch::new("busy")
//!                 .when(|_, job| job.is_string())
//!                 .action(|x, job| {
//!                     let jobs = x["jobs"].as_i64().unwrap_or(0);
//!                     ActionResult::output(job.clone()).with_update("jobs", json!(jobs + 1))
//!                 }),
//!         ),
//!     )
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! let generators = [GeneratorTransition::single(
//!     "idle",
//!     Some("submit"),
//!     "busy",
//!     InputGenerator::new(|_, _| GeneratedInput::new(json!("report"))),
//! )];
//! let settings = GenerationSettings::new(AllTransitions {
//!     target_vertex: "busy".into(),
//! });
//!
//! let tests = generate_test_sequences(&fsm, &generators, &Interpreter::new(), settings).unwrap();
//!
//! assert_eq!(tests.len(), 1);
//! assert_eq!(tests[0].control_state_sequence, ["nok", "idle", "busy"]);
//! assert_eq!(tests[0].output_sequence, [json!("report")]);
//! ```

pub mod builder;
pub mod core;
pub mod engine;
pub mod generation;
pub mod graph;

// Re-export commonly used types
pub use crate::builder::{FsmDefinition, Target, Transition, TransitionBuilder};
pub use crate::core::{ControlState, StateTree, INIT_EVENT, INIT_STATE};
pub use crate::engine::{ExecutionEngine, InputEvent, Interpreter, MachineInstance};
pub use crate::generation::{generate_test_sequences, GenerationError, GenerationSettings, TestCase};
