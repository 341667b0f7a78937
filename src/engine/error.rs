//! Errors raised by machine instances.

use thiserror::Error;

/// Errors that can occur while driving a machine instance.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("Machine has not been started. Call .start() before sending inputs")]
    NotStarted,

    #[error("Machine has already been started")]
    AlreadyStarted,

    #[error("No enabled init transition leaves '{state}'")]
    NoInitialTransition { state: String },

    #[error("More than {limit} eventless transitions fired in a row, last in '{state}'")]
    EventlessLoop { state: String, limit: usize },
}
