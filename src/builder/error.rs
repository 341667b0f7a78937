//! Build errors for machine definitions and transitions.

use super::validation::DefinitionIssue;
use thiserror::Error;

/// Errors that can occur when building transitions and machine definitions.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Transition source state not specified. Call .from(state)")]
    MissingFromState,

    #[error("Transition target not specified. Call .to(target) or add a .branch(..)")]
    MissingTarget,

    #[error("Transition has both an unconditional target and guarded branches")]
    ConflictingTargets,

    #[error("Invalid machine definition ({} issue(s)): {}", .0.len(), render_issues(.0))]
    InvalidDefinition(Vec<DefinitionIssue>),
}

fn render_issues(issues: &[DefinitionIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
