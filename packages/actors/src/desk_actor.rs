//! Desk actor serving customers from the ticket queue.
//!
//! Neither the queue wait nor the service step runs inside a handler: both
//! are awaited on spawned tasks that post their result back as a message.
//! The desk mailbox stays free, so `Status` is answered at any time.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use office_core::{Customer, DeskId, DeskState, DurationRange, OfficeEvent, TicketNumber};
use rand::rngs::StdRng;
use ractor::{Actor, ActorProcessingErr, ActorRef};
use tokio::sync::{broadcast, oneshot};

use crate::handler::ServiceHandler;
use crate::messages::{DeskMessage, OfficeMessage, Pop, QueueMessage};
use crate::rng::actor_rng;

/// State for the desk actor.
pub struct DeskActorState {
    pub desk_id: DeskId,
    /// Where the desk is in its loop.
    pub state: DeskState,
    /// Customers served so far.
    pub served: u64,
    queue: ActorRef<QueueMessage>,
    office: Option<ActorRef<OfficeMessage>>,
    handler: Arc<dyn ServiceHandler>,
    service_time: DurationRange,
    wait_timeout: Duration,
    rng: StdRng,
    event_tx: Option<broadcast::Sender<OfficeEvent>>,
}

impl DeskActorState {
    fn broadcast(&self, event: OfficeEvent) {
        if let Some(ref tx) = self.event_tx {
            let _ = tx.send(event);
        }
    }

    fn transition(&mut self, next: DeskState) {
        tracing::debug!("{}: {} -> {}", self.desk_id, self.state, next);
        self.state = next;
    }

    /// Ask the queue for a customer; the answer arrives as `Popped`.
    ///
    /// The queue always answers a parked request (customer, expiry or
    /// closure), so the receiver is held without a deadline. A customer
    /// handed out is never dropped on the desk side.
    fn poll(&self, myself: ActorRef<DeskMessage>) -> Result<(), ActorProcessingErr> {
        let (tx, rx) = oneshot::channel();
        self.queue.send_message(QueueMessage::TryPop {
            desk_id: self.desk_id,
            wait: self.wait_timeout,
            reply: tx.into(),
        })?;

        tokio::spawn(async move {
            let message = match rx.await {
                Ok(pop) => DeskMessage::Popped(pop),
                Err(_) => DeskMessage::QueueLost,
            };
            let _ = myself.send_message(message);
        });
        Ok(())
    }

    /// Start serving one customer for a randomly drawn service time.
    fn begin_service(&mut self, myself: ActorRef<DeskMessage>, customer: Customer) {
        let ticket = customer.ticket();
        self.transition(DeskState::Serving { ticket });

        let service_time = self.service_time.sample(&mut self.rng);
        let service = self.handler.serve(self.desk_id, customer, service_time);
        tokio::spawn(async move {
            let started = Instant::now();
            let result = service.await;
            let _ = myself.send_message(DeskMessage::ServiceDone {
                ticket,
                elapsed: started.elapsed(),
                result,
            });
        });
    }

    fn finish_service(
        &mut self,
        ticket: TicketNumber,
        elapsed: Duration,
    ) -> Result<(), ActorProcessingErr> {
        self.served += 1;
        self.broadcast(OfficeEvent::ServiceCompleted {
            desk_id: self.desk_id,
            ticket,
            duration_ms: elapsed.as_millis() as u64,
            timestamp: Utc::now(),
        });
        if let Some(ref office) = self.office {
            office.send_message(OfficeMessage::CustomerServed {
                desk_id: self.desk_id,
                ticket,
            })?;
        }

        self.transition(DeskState::Waiting);
        Ok(())
    }

    fn close(&mut self, queue_size: usize) -> Result<(), ActorProcessingErr> {
        self.transition(DeskState::Terminated);
        tracing::info!("{} closed after {} customers", self.desk_id, self.served);

        self.broadcast(OfficeEvent::DeskClosed {
            desk_id: self.desk_id,
            served: self.served,
            queue_size,
            timestamp: Utc::now(),
        });
        if let Some(ref office) = self.office {
            office.send_message(OfficeMessage::DeskClosed {
                desk_id: self.desk_id,
            })?;
        }
        Ok(())
    }
}

/// Desk actor arguments.
pub struct DeskArgs {
    pub desk_id: DeskId,
    pub queue: ActorRef<QueueMessage>,
    pub office: Option<ActorRef<OfficeMessage>>,
    pub handler: Arc<dyn ServiceHandler>,
    pub service_time: DurationRange,
    pub wait_timeout: Duration,
    pub seed: Option<u64>,
    pub event_tx: Option<broadcast::Sender<OfficeEvent>>,
}

/// Desk actor that serves one customer at a time.
pub struct DeskActor;

impl Actor for DeskActor {
    type Msg = DeskMessage;
    type State = DeskActorState;
    type Arguments = DeskArgs;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        tracing::info!("{} open", args.desk_id);

        let state = DeskActorState {
            desk_id: args.desk_id,
            state: DeskState::Waiting,
            served: 0,
            queue: args.queue,
            office: args.office,
            handler: args.handler,
            service_time: args.service_time,
            wait_timeout: args.wait_timeout,
            rng: actor_rng(args.seed)?,
            event_tx: args.event_tx,
        };
        state.broadcast(OfficeEvent::DeskOpened {
            desk_id: state.desk_id,
            timestamp: Utc::now(),
        });
        Ok(state)
    }

    async fn post_start(
        &self,
        myself: ActorRef<Self::Msg>,
        _state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        myself.send_message(DeskMessage::Poll)?;
        Ok(())
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            DeskMessage::Poll => {
                if !state.state.is_terminated() {
                    state.poll(myself)?;
                }
            }

            DeskMessage::Popped(Pop::Customer(customer)) => {
                state.begin_service(myself, customer);
            }

            // Spurious wake-up: re-check on the next poll.
            DeskMessage::Popped(Pop::Empty) => {
                tracing::trace!("{} still waiting", state.desk_id);
                myself.send_message(DeskMessage::Poll)?;
            }

            DeskMessage::Popped(Pop::Closed { queue_size }) => {
                state.close(queue_size)?;
                myself.stop(Some("office closed".to_string()));
            }

            DeskMessage::QueueLost => {
                return Err(format!("{} lost the ticket queue", state.desk_id).into());
            }

            DeskMessage::ServiceDone {
                ticket,
                elapsed,
                result,
            } => {
                if let Err(e) = result {
                    return Err(format!(
                        "{} failed serving customer {}: {}",
                        state.desk_id, ticket, e
                    )
                    .into());
                }
                state.finish_service(ticket, elapsed)?;
                myself.send_message(DeskMessage::Poll)?;
            }

            DeskMessage::Status { reply } => {
                let _ = reply.send(state.state);
            }
        }

        Ok(())
    }
}
