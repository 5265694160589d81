use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use office_actors::{
    Actor, ActorRef, DeskArgs, QueueActor, QueueActorState, QueueMessage, SimulatedService,
};
use office_core::{
    DeskId, DurationRange, OfficeEvent, QueueStats, SimulationConfig, TicketNumber,
};
use ractor::rpc::CallResult;
use tokio::sync::broadcast;

/// A small office with millisecond-scale timings.
pub fn fast_config(desk_count: u32, ticket_count: u64, first_ticket: i64) -> SimulationConfig {
    SimulationConfig {
        desk_count,
        ticket_count,
        first_ticket: TicketNumber(first_ticket),
        service_time: DurationRange::new(1, 4),
        arrival_interval: DurationRange::new(0, 2),
        wait_timeout_ms: 20,
        seed: Some(7),
    }
}

/// Everything broadcast so far.
pub fn drain_events(rx: &mut broadcast::Receiver<OfficeEvent>) -> Vec<OfficeEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub fn tickets(first: i64, count: i64) -> Vec<TicketNumber> {
    (first..first + count).map(TicketNumber).collect()
}

/// A standalone queue without an office around it.
pub async fn spawn_queue() -> Result<ActorRef<QueueMessage>, Box<dyn Error>> {
    let (queue, _handle) = Actor::spawn(None, QueueActor, QueueActorState::new()).await?;
    Ok(queue)
}

pub async fn queue_stats(queue: &ActorRef<QueueMessage>) -> Result<QueueStats, Box<dyn Error>> {
    let result = ractor::rpc::call(
        queue,
        |reply| QueueMessage::GetStats { reply },
        Some(Duration::from_secs(2)),
    )
    .await?;
    match result {
        CallResult::Success(stats) => Ok(stats),
        _ => Err("queue did not answer".into()),
    }
}

/// Desk 0 on `queue`, reporting to no office.
pub fn desk_args(queue: &ActorRef<QueueMessage>, service_ms: u64, wait_ms: u64) -> DeskArgs {
    DeskArgs {
        desk_id: DeskId(0),
        queue: queue.clone(),
        office: None,
        handler: Arc::new(SimulatedService),
        service_time: DurationRange::fixed(service_ms),
        wait_timeout: Duration::from_millis(wait_ms),
        seed: Some(3),
        event_tx: None,
    }
}
