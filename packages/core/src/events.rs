//! Event types for observing a running office.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DeskId, TicketNumber};

/// Events emitted by the office actors for logging and telemetry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OfficeEvent {
    /// A desk opened and started waiting for customers.
    ///
    /// Desks never read the queue, so this carries no queue size.
    DeskOpened {
        desk_id: DeskId,
        timestamp: DateTime<Utc>,
    },
    /// A new customer took a ticket and joined the queue.
    CustomerIssued {
        ticket: TicketNumber,
        queue_size: usize,
        timestamp: DateTime<Utc>,
    },
    /// A customer was handed to a desk.
    CustomerAssigned {
        desk_id: DeskId,
        ticket: TicketNumber,
        queue_size: usize,
        timestamp: DateTime<Utc>,
    },
    /// A desk finished with a customer. No queue size, as for `DeskOpened`;
    /// the next `CustomerAssigned` or `DeskClosed` reports it.
    ServiceCompleted {
        desk_id: DeskId,
        ticket: TicketNumber,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
    /// No more tickets will be issued.
    OfficeClosed {
        issued: u64,
        queue_size: usize,
        timestamp: DateTime<Utc>,
    },
    /// A desk saw a closed office and an empty queue and stopped.
    DeskClosed {
        desk_id: DeskId,
        served: u64,
        queue_size: usize,
        timestamp: DateTime<Utc>,
    },
    /// A desk stopped abnormally.
    DeskFailed {
        desk_id: DeskId,
        error: String,
        timestamp: DateTime<Utc>,
    },
}

impl OfficeEvent {
    /// Get the timestamp of the event.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            OfficeEvent::DeskOpened { timestamp, .. } => *timestamp,
            OfficeEvent::CustomerIssued { timestamp, .. } => *timestamp,
            OfficeEvent::CustomerAssigned { timestamp, .. } => *timestamp,
            OfficeEvent::ServiceCompleted { timestamp, .. } => *timestamp,
            OfficeEvent::OfficeClosed { timestamp, .. } => *timestamp,
            OfficeEvent::DeskClosed { timestamp, .. } => *timestamp,
            OfficeEvent::DeskFailed { timestamp, .. } => *timestamp,
        }
    }

    /// Get the desk this event is about, if any.
    pub fn desk_id(&self) -> Option<DeskId> {
        match self {
            OfficeEvent::DeskOpened { desk_id, .. }
            | OfficeEvent::CustomerAssigned { desk_id, .. }
            | OfficeEvent::ServiceCompleted { desk_id, .. }
            | OfficeEvent::DeskClosed { desk_id, .. }
            | OfficeEvent::DeskFailed { desk_id, .. } => Some(*desk_id),
            _ => None,
        }
    }

    /// Get the ticket this event is about, if any.
    pub fn ticket(&self) -> Option<TicketNumber> {
        match self {
            OfficeEvent::CustomerIssued { ticket, .. }
            | OfficeEvent::CustomerAssigned { ticket, .. }
            | OfficeEvent::ServiceCompleted { ticket, .. } => Some(*ticket),
            _ => None,
        }
    }

    /// Queue size observed when the event happened, if reported.
    pub fn queue_size(&self) -> Option<usize> {
        match self {
            OfficeEvent::CustomerIssued { queue_size, .. }
            | OfficeEvent::CustomerAssigned { queue_size, .. }
            | OfficeEvent::OfficeClosed { queue_size, .. }
            | OfficeEvent::DeskClosed { queue_size, .. } => Some(*queue_size),
            _ => None,
        }
    }

    /// Get a short description of this event for logging.
    pub fn description(&self) -> String {
        match self {
            OfficeEvent::DeskOpened { desk_id, .. } => format!("{} open", desk_id),
            OfficeEvent::CustomerIssued {
                ticket, queue_size, ..
            } => format!("[+] new customer with ticket {} (queue: {})", ticket, queue_size),
            OfficeEvent::CustomerAssigned {
                desk_id,
                ticket,
                queue_size,
                ..
            } => format!(
                "[-] {} handling customer {} (queue: {})",
                desk_id, ticket, queue_size
            ),
            OfficeEvent::ServiceCompleted {
                desk_id,
                ticket,
                duration_ms,
                ..
            } => format!(
                "[ ] {} done with customer {} in {}ms",
                desk_id, ticket, duration_ms
            ),
            OfficeEvent::OfficeClosed {
                issued, queue_size, ..
            } => format!(
                "office closed after {} tickets (queue: {})",
                issued, queue_size
            ),
            OfficeEvent::DeskClosed {
                desk_id, served, ..
            } => format!("{} closed after {} customers", desk_id, served),
            OfficeEvent::DeskFailed { desk_id, error, .. } => {
                format!("{} failed: {}", desk_id, error)
            }
        }
    }
}
