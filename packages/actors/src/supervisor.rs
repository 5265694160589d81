//! Supervisor actor that runs one office day and reports its outcome.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use office_core::{DeskFailure, DeskId, OfficeEvent, OfficeReport, SimulationConfig};
use ractor::rpc::CallResult;
use ractor::{Actor, ActorId, ActorProcessingErr, ActorRef, SupervisionEvent};
use tokio::sync::{broadcast, oneshot};

use crate::desk_actor::{DeskActor, DeskArgs};
use crate::handler::ServiceHandler;
use crate::issuer_actor::{IssuerActor, IssuerArgs};
use crate::messages::{OfficeError, OfficeMessage, QueueMessage};
use crate::queue_actor::{QueueActor, QueueActorState};

/// How long `Finish` waits for the queue's counters.
const STATS_TIMEOUT: Duration = Duration::from_secs(1);

/// Outcome delivered once every child has stopped.
pub type OfficeOutcome = Result<OfficeReport, OfficeError>;

/// Office supervisor arguments.
pub struct OfficeArgs {
    pub config: SimulationConfig,
    pub handler: Arc<dyn ServiceHandler>,
    pub event_tx: broadcast::Sender<OfficeEvent>,
    pub outcome_tx: oneshot::Sender<OfficeOutcome>,
}

/// State for the supervisor actor.
pub struct OfficeState {
    config: SimulationConfig,
    handler: Arc<dyn ServiceHandler>,
    event_tx: broadcast::Sender<OfficeEvent>,
    outcome_tx: Option<oneshot::Sender<OfficeOutcome>>,
    queue: Option<ActorRef<QueueMessage>>,
    /// Desks still running, by actor.
    desks: HashMap<ActorId, DeskId>,
    issuer: Option<ActorId>,
    issuer_done: bool,
    issued_reported: bool,
    finishing: bool,
    report: OfficeReport,
    started: Instant,
}

impl OfficeState {
    fn new(args: OfficeArgs) -> Self {
        Self {
            config: args.config,
            handler: args.handler,
            event_tx: args.event_tx,
            outcome_tx: Some(args.outcome_tx),
            queue: None,
            desks: HashMap::new(),
            issuer: None,
            issuer_done: false,
            issued_reported: false,
            finishing: false,
            report: OfficeReport::default(),
            started: Instant::now(),
        }
    }

    fn deliver(&mut self, outcome: OfficeOutcome) {
        if let Some(tx) = self.outcome_tx.take() {
            let _ = tx.send(outcome);
        }
    }

    fn child_stopped(&mut self, id: ActorId, failure: Option<String>) {
        if let Some(desk_id) = self.desks.remove(&id) {
            if let Some(error) = failure {
                tracing::warn!("{} terminated abnormally: {}", desk_id, error);
                let _ = self.event_tx.send(OfficeEvent::DeskFailed {
                    desk_id,
                    error: error.clone(),
                    timestamp: Utc::now(),
                });
                self.report.failures.push(DeskFailure { desk_id, error });
            }
            return;
        }

        if self.issuer == Some(id) {
            self.issuer_done = true;
            if let Some(error) = failure {
                tracing::warn!("Issuer terminated abnormally: {}", error);
                // A failed issuer skips its own closing.
                if let Some(ref queue) = self.queue {
                    let _ = queue.send_message(QueueMessage::Close {
                        issued: self.report.issued,
                    });
                }
            }
            return;
        }

        if let Some(error) = failure {
            tracing::error!("Ticket queue terminated abnormally: {}", error);
        }
    }

    fn all_stopped(&self) -> bool {
        self.desks.is_empty() && self.issuer_done
    }

    fn outcome(&mut self) -> OfficeOutcome {
        let mut report = std::mem::take(&mut self.report);
        report.elapsed_ms = self.started.elapsed().as_millis() as u64;

        if !report.failures.is_empty() {
            return Err(OfficeError::DeskFailures {
                failures: report.failures.clone(),
                report: Box::new(report),
            });
        }
        if report.total_served() != self.config.ticket_count
            || !report.is_complete(self.config.expected_tickets())
        {
            return Err(OfficeError::Incomplete {
                expected: self.config.ticket_count,
                served: report.total_served(),
                report: Box::new(report),
            });
        }
        Ok(report)
    }
}

async fn spawn_children(
    myself: &ActorRef<OfficeMessage>,
    state: &mut OfficeState,
) -> Result<(), ActorProcessingErr> {
    let cell = myself.get_cell();
    let config = state.config.clone();

    let queue_state = QueueActorState::new().with_event_tx(state.event_tx.clone());
    let (queue, _handle) = Actor::spawn_linked(None, QueueActor, queue_state, cell.clone())
        .await
        .map_err(|e| ActorProcessingErr::from(format!("Failed to spawn queue: {}", e)))?;
    state.queue = Some(queue.clone());

    for n in 0..config.desk_count {
        let desk_id = DeskId(n);
        let args = DeskArgs {
            desk_id,
            queue: queue.clone(),
            office: Some(myself.clone()),
            handler: state.handler.clone(),
            service_time: config.service_time,
            wait_timeout: config.wait_timeout(),
            seed: config.seed_for(u64::from(n) + 1),
            event_tx: Some(state.event_tx.clone()),
        };
        let (desk, _handle) = Actor::spawn_linked(None, DeskActor, args, cell.clone())
            .await
            .map_err(|e| {
                ActorProcessingErr::from(format!("Failed to spawn {}: {}", desk_id, e))
            })?;
        state.desks.insert(desk.get_id(), desk_id);
    }

    let args = IssuerArgs {
        first_ticket: config.first_ticket,
        ticket_count: config.ticket_count,
        arrival_interval: config.arrival_interval,
        queue: queue.clone(),
        office: Some(myself.clone()),
        seed: config.seed_for(0),
    };
    let (issuer, _handle) = Actor::spawn_linked(None, IssuerActor, args, cell)
        .await
        .map_err(|e| ActorProcessingErr::from(format!("Failed to spawn issuer: {}", e)))?;

    state.issuer = Some(issuer.get_id());
    Ok(())
}

/// Supervisor actor that owns the queue, the desks and the issuer.
pub struct OfficeSupervisor;

impl Actor for OfficeSupervisor {
    type Msg = OfficeMessage;
    type State = OfficeState;
    type Arguments = OfficeArgs;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        tracing::info!(
            "Opening office with {} desks for {} customers",
            args.config.desk_count,
            args.config.ticket_count
        );
        Ok(OfficeState::new(args))
    }

    async fn post_start(
        &self,
        myself: ActorRef<Self::Msg>,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        if let Err(e) = spawn_children(&myself, state).await {
            state.deliver(Err(OfficeError::Spawn(e.to_string())));
            if let Some(queue) = state.queue.take() {
                let _ = queue.send_message(QueueMessage::Close { issued: 0 });
            }
            return Err(e);
        }
        Ok(())
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            OfficeMessage::CustomerServed { desk_id, ticket } => {
                state.report.served.entry(desk_id).or_default().push(ticket);
            }

            OfficeMessage::DeskClosed { desk_id } => {
                state.report.closed_desks.push(desk_id);
            }

            OfficeMessage::IssuingFinished { issued } => {
                state.report.issued = issued;
                state.issued_reported = true;
            }

            OfficeMessage::Finish => {
                if let Some(queue) = state.queue.take() {
                    if !state.issued_reported {
                        let stats = ractor::rpc::call(
                            &queue,
                            |reply| QueueMessage::GetStats { reply },
                            Some(STATS_TIMEOUT),
                        )
                        .await;
                        if let Ok(CallResult::Success(stats)) = stats {
                            state.report.issued = stats.pushed;
                        }
                    }
                    queue.stop(None);
                }
                let outcome = state.outcome();
                match &outcome {
                    Ok(report) => tracing::info!(
                        "Office finished: {} customers served in {}ms",
                        report.total_served(),
                        report.elapsed_ms
                    ),
                    Err(e) => tracing::warn!("Office finished abnormally: {}", e),
                }
                state.deliver(outcome);
                myself.stop(None);
            }
        }

        Ok(())
    }

    async fn handle_supervisor_evt(
        &self,
        myself: ActorRef<Self::Msg>,
        message: SupervisionEvent,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            SupervisionEvent::ActorTerminated(cell, _, reason) => {
                tracing::debug!(
                    "Child actor {} stopped: {}",
                    cell.get_id(),
                    reason.unwrap_or_default()
                );
                state.child_stopped(cell.get_id(), None);
            }
            SupervisionEvent::ActorFailed(cell, err) => {
                state.child_stopped(cell.get_id(), Some(err.to_string()));
            }
            _ => return Ok(()),
        }

        if state.all_stopped() && !state.finishing {
            state.finishing = true;
            // Queued behind any report a child sent before stopping.
            myself.send_message(OfficeMessage::Finish)?;
        }
        Ok(())
    }
}

/// Run one office day to completion.
///
/// Resolves only after the issuer and every desk have stopped.
pub async fn start_office(
    config: SimulationConfig,
    handler: Arc<dyn ServiceHandler>,
    event_tx: broadcast::Sender<OfficeEvent>,
) -> OfficeOutcome {
    let (outcome_tx, outcome_rx) = oneshot::channel();
    let args = OfficeArgs {
        config,
        handler,
        event_tx,
        outcome_tx,
    };

    let (_office, handle) = Actor::spawn(None, OfficeSupervisor, args).await?;
    let outcome = outcome_rx.await.map_err(|_| OfficeError::CoordinatorLost)?;
    let _ = handle.await;
    outcome
}
