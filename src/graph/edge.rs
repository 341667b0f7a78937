//! Flattened transition edges.

use super::structure::GraphEdge;
use crate::core::{event_label, Action, ControlState, Guard, HistoryTarget};
use std::fmt;

/// Fields shared by every edge: one guard branch of one configured
/// transition, with concrete endpoints.
#[derive(Clone, Debug)]
pub struct EdgeSpec {
    pub from: ControlState,
    pub event: Option<String>,
    pub to: ControlState,
    pub predicate: Option<Guard>,
    pub action: Action,
    pub guard_index: usize,
    pub transition_index: usize,
}

/// A transition edge, tagged by how it was obtained from its transition.
#[derive(Clone, Debug)]
pub enum Edge {
    /// Taken as configured.
    Plain(EdgeSpec),
    /// One leaf of a transition configured from a compound state.
    CompoundExpanded {
        spec: EdgeSpec,
        compound: ControlState,
    },
    /// One member of the trace set of a history target.
    HistoryExpanded {
        spec: EdgeSpec,
        history: HistoryTarget,
    },
    /// Both of the above.
    CompoundHistoryExpanded {
        spec: EdgeSpec,
        compound: ControlState,
        history: HistoryTarget,
    },
}

impl Edge {
    pub fn spec(&self) -> &EdgeSpec {
        match self {
            Self::Plain(spec)
            | Self::CompoundExpanded { spec, .. }
            | Self::HistoryExpanded { spec, .. }
            | Self::CompoundHistoryExpanded { spec, .. } => spec,
        }
    }

    pub fn from(&self) -> &str {
        &self.spec().from
    }

    pub fn to(&self) -> &str {
        &self.spec().to
    }

    pub fn event(&self) -> Option<&str> {
        self.spec().event.as_deref()
    }

    pub fn predicate(&self) -> Option<&Guard> {
        self.spec().predicate.as_ref()
    }

    pub fn guard_index(&self) -> usize {
        self.spec().guard_index
    }

    pub fn transition_index(&self) -> usize {
        self.spec().transition_index
    }

    /// The compound state the transition was configured from, if expanded.
    pub fn compound(&self) -> Option<&str> {
        match self {
            Self::CompoundExpanded { compound, .. }
            | Self::CompoundHistoryExpanded { compound, .. } => Some(compound),
            Self::Plain(_) | Self::HistoryExpanded { .. } => None,
        }
    }

    /// The history target this edge is a trace of, if any.
    pub fn history(&self) -> Option<&HistoryTarget> {
        match self {
            Self::HistoryExpanded { history, .. }
            | Self::CompoundHistoryExpanded { history, .. } => Some(history),
            Self::Plain(_) | Self::CompoundExpanded { .. } => None,
        }
    }

    /// Origin of the configured transition: the compound state for expanded
    /// edges, `from` otherwise.
    pub fn transition_origin(&self) -> &str {
        self.compound().unwrap_or_else(|| self.from())
    }
}

impl GraphEdge for Edge {
    fn origin(&self) -> &str {
        self.from()
    }

    fn target(&self) -> &str {
        self.to()
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -{}-> {}",
            self.from(),
            event_label(self.event()),
            self.to()
        )?;
        if let Some(compound) = self.compound() {
            write!(f, " (from {compound})")?;
        }
        if let Some(history) = self.history() {
            write!(f, " (history of {})", history.parent())?;
        }
        Ok(())
    }
}
