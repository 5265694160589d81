//! Ticket and customer domain types.

use serde::{Deserialize, Serialize};

/// A ticket number handed out by the ticketing machine.
///
/// Lower numbers are served first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TicketNumber(pub i64);

impl std::fmt::Display for TicketNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A customer waiting for service, identified by their ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Customer {
    ticket: TicketNumber,
}

impl Customer {
    pub fn new(ticket: TicketNumber) -> Self {
        Self { ticket }
    }

    pub fn ticket(&self) -> TicketNumber {
        self.ticket
    }
}

/// Issues strictly increasing ticket numbers, starting at `first_ticket`.
///
/// Single owner only: the issuing process holds it by value and every
/// mutating call takes `&mut self`. Yields `None` once the ticket numbers
/// run past `i64::MAX`.
#[derive(Debug, Clone)]
pub struct TicketSequencer {
    first_ticket: TicketNumber,
    issued: u64,
}

impl TicketSequencer {
    /// Create a sequencer whose first ticket will be `first_ticket`.
    pub fn new(first_ticket: TicketNumber) -> Self {
        Self {
            first_ticket,
            issued: 0,
        }
    }

    /// The most recently issued ticket, or `first_ticket - 1` if none was
    /// issued yet (saturating at `i64::MIN`).
    pub fn last(&self) -> TicketNumber {
        TicketNumber(
            self.first_ticket
                .0
                .saturating_add_unsigned(self.issued)
                .saturating_sub(1),
        )
    }

    /// Number of tickets issued since construction or the last reset.
    pub fn issued(&self) -> u64 {
        self.issued
    }

    /// Rewind to the initial state.
    pub fn reset(&mut self) {
        self.issued = 0;
    }

    pub fn first(&self) -> TicketNumber {
        self.first_ticket
    }
}

impl Iterator for TicketSequencer {
    type Item = TicketNumber;

    /// Issue the next ticket.
    fn next(&mut self) -> Option<TicketNumber> {
        let ticket = self.first_ticket.0.checked_add_unsigned(self.issued)?;
        self.issued += 1;
        Some(TicketNumber(ticket))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequencer_starts_at_first_ticket() {
        let mut seq = TicketSequencer::new(TicketNumber(100));
        assert_eq!(TicketSequencer::last(&seq), TicketNumber(99));
        assert_eq!(seq.issued(), 0);

        assert_eq!(seq.next(), Some(TicketNumber(100)));
        assert_eq!(seq.next(), Some(TicketNumber(101)));
        assert_eq!(TicketSequencer::last(&seq), TicketNumber(101));
        assert_eq!(seq.issued(), 2);
    }

    #[test]
    fn test_sequencer_is_strictly_increasing() {
        let mut seq = TicketSequencer::new(TicketNumber(-3));
        let mut previous = TicketSequencer::last(&seq);
        for ticket in seq.by_ref().take(50) {
            assert!(ticket > previous);
            previous = ticket;
        }
        assert_eq!(TicketSequencer::last(&seq), TicketNumber(46));
    }

    #[test]
    fn test_reset_replays_identical_sequence() {
        let mut seq = TicketSequencer::new(TicketNumber(7));
        let first_run: Vec<_> = seq.by_ref().take(10).collect();

        seq.reset();
        assert_eq!(TicketSequencer::last(&seq), TicketNumber(6));

        let second_run: Vec<_> = seq.by_ref().take(10).collect();
        assert_eq!(first_run, second_run);
    }

    #[test]
    fn test_sequencer_stops_at_largest_ticket() {
        let mut seq = TicketSequencer::new(TicketNumber(i64::MAX - 1));
        assert_eq!(seq.next(), Some(TicketNumber(i64::MAX - 1)));
        assert_eq!(seq.next(), Some(TicketNumber(i64::MAX)));
        assert_eq!(seq.next(), None);
        assert_eq!(seq.issued(), 2);
        assert_eq!(TicketSequencer::last(&seq), TicketNumber(i64::MAX));
    }

    #[test]
    fn test_sequencer_starting_at_smallest_ticket() {
        let mut seq = TicketSequencer::new(TicketNumber(i64::MIN));
        assert_eq!(TicketSequencer::last(&seq), TicketNumber(i64::MIN));
        assert_eq!(seq.issued(), 0);
        assert_eq!(seq.next(), Some(TicketNumber(i64::MIN)));
        assert_eq!(TicketSequencer::last(&seq), TicketNumber(i64::MIN));
    }

    #[test]
    fn test_customer_keeps_ticket() {
        let customer = Customer::new(TicketNumber(42));
        let copy = customer;
        assert_eq!(customer.ticket(), TicketNumber(42));
        assert_eq!(copy, customer);
    }
}
