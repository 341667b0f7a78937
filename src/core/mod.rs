//! Pure hierarchy and history logic.
//!
//! This module contains the side-effect free core of the generator:
//! - The control-state tree and its parent/child/leaf analysis
//! - History tracking derived from a sequence of exited states
//! - Guard predicates and transition actions
//!
//! Nothing in here drives a machine or walks a graph.

mod error;
mod guard;
mod hierarchy;
mod history;
mod state;

pub use error::AnalysisError;
pub use guard::{Action, ActionResult, Guard, NO_OUTPUT};
pub use hierarchy::{analyze_state_tree, StateHierarchy};
pub use history::{
    compute_ancestors, resolve_history, AncestorAnalysis, History, HistoryKind, HistoryTarget,
    StateAncestors,
};
pub use state::{
    event_label, is_init_state, ControlState, EventKind, NodeId, StateTree, StateTreeFormatError,
    INIT_EVENT, INIT_STATE,
};
