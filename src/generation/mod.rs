//! Test sequence generation.
//!
//! Input generators are bound to the branches of the machine's transitions.
//! [`generate_test_sequences`] searches the flattened graph under a
//! [`Strategy`], keeping only the paths the machine can actually be driven
//! along, and returns one [`TestCase`] per path that reached the goal.

mod error;
mod generators;
mod sequences;
mod strategy;

pub use error::GenerationError;
pub use generators::{
    GeneratedInput, GeneratorGuard, GeneratorIndex, GeneratorTransition, InputGenerator,
};
pub use sequences::{generate_test_sequences, GenerationSettings, PathTraversalState, TestCase};
pub use strategy::{
    times_circled_on, AllNTransitions, AllTransitions, EdgeContext, FnStrategy, Strategy,
    StrategyConfig,
};
