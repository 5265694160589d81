//! Actor system for the ticket office.
//!
//! This crate provides the Ractor-based actors that simulate one office
//! day: a ticketing machine letting customers in, a shared ticket queue and
//! a row of service desks draining it.
//!
//! # Architecture
//!
//! - `OfficeSupervisor` - Spawns and joins every other actor, builds the report
//! - `QueueActor` - Owns waiting customers (lowest ticket first) and the open flag
//! - `DeskActor` - Serves one customer at a time until the office is drained
//! - `IssuerActor` - Issues tickets at random intervals, then closes the office
//!
//! # Usage
//!
//! ```ignore
//! use office_actors::Office;
//! use office_core::SimulationConfig;
//!
//! let office = Office::new(SimulationConfig::default())?;
//! let mut events = office.subscribe();
//! let report = office.run().await?;
//! ```

mod desk_actor;
mod handler;
mod issuer_actor;
mod messages;
mod office;
mod queue_actor;
mod rng;
mod supervisor;

pub use desk_actor::{DeskActor, DeskArgs};
pub use handler::{FnHandler, HandlerFuture, HandlerResult, ServiceHandler, SimulatedService};
pub use issuer_actor::{IssuerActor, IssuerArgs};
pub use messages::{DeskMessage, IssuerMessage, OfficeError, OfficeMessage, Pop, QueueMessage};
pub use office::Office;
pub use queue_actor::{QueueActor, QueueActorState};
pub use supervisor::{OfficeArgs, OfficeOutcome, OfficeSupervisor, start_office};

/// Re-export ractor types for convenience.
pub use ractor::{Actor, ActorRef, RpcReplyPort};
