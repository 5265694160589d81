//! Service desk identity and lifecycle.

use serde::{Deserialize, Serialize};

use crate::TicketNumber;

/// Identifier of a service desk, numbered from zero.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DeskId(pub u32);

impl std::fmt::Display for DeskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "desk-{}", self.0)
    }
}

/// Where a desk is in its serve loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DeskState {
    /// No customer assigned; waiting on the queue.
    #[default]
    Waiting,
    /// Holding exactly one customer.
    Serving { ticket: TicketNumber },
    /// Office closed and the queue was drained.
    Terminated,
}

impl DeskState {
    pub fn is_terminated(&self) -> bool {
        matches!(self, DeskState::Terminated)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeskState::Waiting => "waiting",
            DeskState::Serving { .. } => "serving",
            DeskState::Terminated => "terminated",
        }
    }
}

impl std::fmt::Display for DeskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeskState::Serving { ticket } => write!(f, "serving {}", ticket),
            other => f.write_str(other.as_str()),
        }
    }
}
