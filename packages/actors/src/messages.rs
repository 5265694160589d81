//! Message types for actor communication.

use std::time::Duration;

use office_core::{
    ConfigError, Customer, DeskFailure, DeskId, DeskState, OfficeReport, QueueStats, TicketNumber,
};
use ractor::RpcReplyPort;

use crate::handler::HandlerResult;

/// Answer to a desk asking the queue for its next customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pop {
    /// The lowest-numbered customer, now owned by the asking desk.
    Customer(Customer),
    /// Nobody arrived within the wait; re-check and ask again.
    Empty,
    /// The office is closed and the queue is drained.
    Closed { queue_size: usize },
}

/// Messages for the QueueActor.
#[derive(Debug)]
pub enum QueueMessage {
    /// Add a customer. Never rejected.
    Push { customer: Customer },

    /// Take the lowest ticket, waiting up to `wait` while the queue is empty.
    TryPop {
        desk_id: DeskId,
        wait: Duration,
        reply: RpcReplyPort<Pop>,
    },

    /// A parked `TryPop` ran out of time.
    WaitExpired { waiter: u64 },

    /// Current number of queued customers.
    Size { reply: RpcReplyPort<usize> },

    /// Get queue stats.
    GetStats { reply: RpcReplyPort<QueueStats> },

    /// No more customers will be pushed.
    Close { issued: u64 },
}

/// Messages for the DeskActor.
#[derive(Debug)]
pub enum DeskMessage {
    /// Ask the queue for the next customer.
    Poll,

    /// The queue answered the last poll.
    Popped(Pop),

    /// The queue dropped the last poll without answering.
    QueueLost,

    /// The service step for `ticket` returned.
    ServiceDone {
        ticket: TicketNumber,
        elapsed: Duration,
        result: HandlerResult,
    },

    /// Report where the desk is in its loop. Answered at once, also while
    /// the desk is parked on the queue or serving.
    Status { reply: RpcReplyPort<DeskState> },
}

/// Messages for the IssuerActor.
#[derive(Debug)]
pub enum IssuerMessage {
    /// Issue one more ticket, or close the office if all were issued.
    IssueNext,
}

/// Messages for the OfficeSupervisor.
#[derive(Debug)]
pub enum OfficeMessage {
    /// A desk finished serving a customer.
    CustomerServed { desk_id: DeskId, ticket: TicketNumber },

    /// A desk drained the queue and is about to stop.
    DeskClosed { desk_id: DeskId },

    /// The issuer closed the office.
    IssuingFinished { issued: u64 },

    /// Every child has stopped; build the report.
    Finish,
}

/// Error type for running an office.
#[derive(Debug, thiserror::Error)]
pub enum OfficeError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to spawn actor: {0}")]
    Spawn(String),

    #[error("{} desk(s) failed: {}", .failures.len(), format_failures(.failures))]
    DeskFailures {
        failures: Vec<DeskFailure>,
        report: Box<OfficeReport>,
    },

    #[error("served {served} of {expected} customers")]
    Incomplete {
        expected: u64,
        served: u64,
        report: Box<OfficeReport>,
    },

    #[error("office supervisor stopped without a report")]
    CoordinatorLost,
}

fn format_failures(failures: &[DeskFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<ractor::SpawnErr> for OfficeError {
    fn from(err: ractor::SpawnErr) -> Self {
        OfficeError::Spawn(err.to_string())
    }
}
