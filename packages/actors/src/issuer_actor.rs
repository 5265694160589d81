//! Issuer actor: the ticketing machine at the office door.

use office_core::{Customer, DurationRange, TicketNumber, TicketSequencer};
use rand::rngs::StdRng;
use ractor::{Actor, ActorProcessingErr, ActorRef};

use crate::messages::{IssuerMessage, OfficeMessage, QueueMessage};
use crate::rng::actor_rng;

/// State for the issuer actor.
pub struct IssuerActorState {
    sequencer: TicketSequencer,
    ticket_count: u64,
    arrival_interval: DurationRange,
    queue: ActorRef<QueueMessage>,
    office: Option<ActorRef<OfficeMessage>>,
    rng: StdRng,
    closed: bool,
}

impl IssuerActorState {
    fn close_office(&mut self) -> Result<(), ActorProcessingErr> {
        let issued = self.sequencer.issued();
        self.closed = true;
        self.queue.send_message(QueueMessage::Close { issued })?;
        if let Some(ref office) = self.office {
            office.send_message(OfficeMessage::IssuingFinished { issued })?;
        }
        Ok(())
    }
}

/// Issuer actor arguments.
pub struct IssuerArgs {
    pub first_ticket: TicketNumber,
    pub ticket_count: u64,
    pub arrival_interval: DurationRange,
    pub queue: ActorRef<QueueMessage>,
    pub office: Option<ActorRef<OfficeMessage>>,
    pub seed: Option<u64>,
}

/// Issuer actor that lets customers in at random intervals.
pub struct IssuerActor;

impl Actor for IssuerActor {
    type Msg = IssuerMessage;
    type State = IssuerActorState;
    type Arguments = IssuerArgs;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        tracing::info!(
            "Issuing {} tickets starting at {}",
            args.ticket_count,
            args.first_ticket
        );

        Ok(IssuerActorState {
            sequencer: TicketSequencer::new(args.first_ticket),
            ticket_count: args.ticket_count,
            arrival_interval: args.arrival_interval,
            queue: args.queue,
            office: args.office,
            rng: actor_rng(args.seed)?,
            closed: false,
        })
    }

    async fn post_start(
        &self,
        myself: ActorRef<Self::Msg>,
        _state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        myself.send_message(IssuerMessage::IssueNext)?;
        Ok(())
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            IssuerMessage::IssueNext => {
                if state.sequencer.issued() >= state.ticket_count {
                    state.close_office()?;
                    myself.stop(Some("all tickets issued".to_string()));
                    return Ok(());
                }

                let Some(ticket) = state.sequencer.next() else {
                    return Err(format!(
                        "ticket numbers exhausted after {}",
                        TicketSequencer::last(&state.sequencer)
                    )
                    .into());
                };
                let customer = Customer::new(ticket);
                state.queue.send_message(QueueMessage::Push { customer })?;
                tracing::debug!("Issued ticket {}", customer.ticket());

                let interval = state.arrival_interval.sample(&mut state.rng);
                tokio::time::sleep(interval).await;
                myself.send_message(IssuerMessage::IssueNext)?;
            }
        }

        Ok(())
    }

    async fn post_stop(
        &self,
        _myself: ActorRef<Self::Msg>,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        if !state.closed {
            tracing::warn!(
                "Issuer stopped after {} of {} tickets; closing office",
                state.sequencer.issued(),
                state.ticket_count
            );
            state.close_office()?;
        }
        Ok(())
    }
}
