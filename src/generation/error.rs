//! Errors that abort test generation.

use crate::core::AnalysisError;
use crate::engine::EngineError;
use thiserror::Error;

/// Errors that stop generation entirely.
///
/// Infeasible edges are not errors: they only shrink the result set.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error(
        "Cannot leave initial state '{state}' on event '{event}': only the init event may leave it. Check the machine configuration"
    )]
    InitStateEvent { state: String, event: String },

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}
