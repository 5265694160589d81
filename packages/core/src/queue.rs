//! Ticket queue snapshot types.

use serde::{Deserialize, Serialize};

/// Statistics for the ticket queue at one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueStats {
    /// Customers waiting for a desk.
    pub pending: usize,
    /// Customers pushed so far.
    pub pushed: u64,
    /// Customers handed to a desk so far.
    pub popped: u64,
    /// Desks parked on an empty queue.
    pub waiting_desks: usize,
    /// Whether new customers may still arrive.
    pub open: bool,
}

impl QueueStats {
    /// True once the office is closed and nobody is left waiting.
    pub fn is_drained(&self) -> bool {
        !self.open && self.pending == 0
    }
}
