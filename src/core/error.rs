//! Errors raised while analyzing a control-state tree.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnalysisError {
    /// There is no control state to analyze.
    #[error("Invalid input: cannot compute ancestors of an empty control-state tree")]
    EmptyStateTree,
}
