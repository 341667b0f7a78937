//! Execution of machine definitions.
//!
//! Test generation does not interpret transitions itself: it drives a
//! [`MachineInstance`] obtained from an [`ExecutionEngine`], replaying inputs
//! and reading back the outputs and extended states of every fired
//! transition. [`Interpreter`] is the engine shipped with the crate.

mod error;
mod interpreter;
mod machine;

pub use error::EngineError;
pub use interpreter::{Interpreter, InterpreterSettings};
pub use machine::{ExecutionEngine, InputEvent, InputEventFormatError, MachineInstance, StepOutput};
