//! Outcome of a finished office run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{DeskId, TicketNumber};

/// A desk that stopped abnormally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeskFailure {
    pub desk_id: DeskId,
    pub error: String,
}

impl std::fmt::Display for DeskFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.desk_id, self.error)
    }
}

/// What happened during one simulated office day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OfficeReport {
    /// Tickets issued before the office closed.
    pub issued: u64,
    /// Tickets served per desk, in service order.
    pub served: BTreeMap<DeskId, Vec<TicketNumber>>,
    /// Desks that drained the queue and closed normally.
    pub closed_desks: Vec<DeskId>,
    /// Desks that stopped abnormally.
    pub failures: Vec<DeskFailure>,
    /// Wall-clock length of the run.
    pub elapsed_ms: u64,
}

impl OfficeReport {
    pub fn total_served(&self) -> u64 {
        self.served.values().map(|t| t.len() as u64).sum()
    }

    /// Every served ticket, sorted.
    pub fn served_tickets(&self) -> Vec<TicketNumber> {
        let mut tickets: Vec<_> = self.served.values().flatten().copied().collect();
        tickets.sort_unstable();
        tickets
    }

    /// All desks closed normally and exactly `expected` was served.
    pub fn is_complete(&self, expected: impl IntoIterator<Item = TicketNumber>) -> bool {
        self.failures.is_empty() && self.served_tickets() == expected.into_iter().collect::<Vec<_>>()
    }
}
