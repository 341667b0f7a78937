//! Builder API for machine definitions.
//!
//! This module provides fluent builders for transitions and machines, plus
//! validation of the assembled definition.

pub mod error;
pub mod machine;
pub mod transition;
pub mod validation;

pub use error::BuildError;
pub use machine::{FsmBuilder, FsmDefinition};
pub use transition::{Branch, Target, Transition, TransitionBuilder};
pub use validation::{validate_definition, DefinitionIssue};

use crate::core::INIT_STATE;

/// Create an unconditional transition with the identity action.
///
/// # Example
///
/// ```
/// use chartwalk::builder::simple_transition;
///
/// let transition = simple_transition("A", Some("click"), "B");
/// assert_eq!(transition.event(), Some("click"));
/// ```
pub fn simple_transition(from: &str, event: Option<&str>, to: &str) -> Transition {
    let builder = TransitionBuilder::new().from(from).to(to);
    let builder = match event {
        Some(event) => builder.event(event),
        None => builder,
    };
    builder
        .build()
        .expect("Simple transition should always build")
}

/// Create the transition leaving the initial state on the init event.
pub fn initial_transition(to: &str) -> Transition {
    TransitionBuilder::new()
        .from(INIT_STATE)
        .on_init()
        .to(to)
        .build()
        .expect("Initial transition should always build")
}
