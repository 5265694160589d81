//! Core domain types for the ticket office simulation.
//!
//! This crate contains shared types used across all packages:
//! - Customer, TicketNumber and TicketSequencer for the ticketing machine
//! - DeskId and DeskState for service desks
//! - SimulationConfig for run parameters
//! - Events and reports for observing a run

mod config;
mod customer;
mod desk;
mod events;
mod queue;
mod report;

pub use config::{ConfigError, DurationRange, SimulationConfig};
pub use customer::{Customer, TicketNumber, TicketSequencer};
pub use desk::{DeskId, DeskState};
pub use events::OfficeEvent;
pub use queue::QueueStats;
pub use report::{DeskFailure, OfficeReport};
