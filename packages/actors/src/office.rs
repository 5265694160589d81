//! Entry point for running a validated office simulation.

use std::sync::Arc;

use office_core::{OfficeEvent, OfficeReport, SimulationConfig};
use tokio::sync::broadcast;

use crate::handler::{ServiceHandler, SimulatedService};
use crate::messages::OfficeError;
use crate::supervisor::start_office;

/// Capacity of the event broadcast channel.
const EVENT_CAPACITY: usize = 1024;

/// A configured office, ready to open.
pub struct Office {
    config: SimulationConfig,
    handler: Arc<dyn ServiceHandler>,
    event_tx: broadcast::Sender<OfficeEvent>,
}

impl Office {
    /// Validate `config`; nothing is spawned if it is rejected.
    pub fn new(config: SimulationConfig) -> Result<Self, OfficeError> {
        config.validate()?;
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            config,
            handler: Arc::new(SimulatedService),
            event_tx,
        })
    }

    /// Replace the default simulated service step.
    pub fn with_handler<H: ServiceHandler>(mut self, handler: H) -> Self {
        self.handler = Arc::new(handler);
        self
    }

    /// Receive every event emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<OfficeEvent> {
        self.event_tx.subscribe()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Open the office and wait until every desk has closed.
    pub async fn run(self) -> Result<OfficeReport, OfficeError> {
        start_office(self.config, self.handler, self.event_tx).await
    }
}
