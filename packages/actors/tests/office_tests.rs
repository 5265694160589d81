mod common;

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use office_actors::{
    Actor, ActorRef, DeskActor, DeskArgs, DeskMessage, FnHandler, HandlerFuture, IssuerActor,
    IssuerArgs, Office, OfficeError, Pop, QueueMessage, SimulatedService, start_office,
};
use office_core::{
    ConfigError, Customer, DeskId, DeskState, DurationRange, OfficeEvent, TicketNumber,
};
use ractor::ActorProcessingErr;
use ractor::rpc::CallResult;
use tokio::sync::broadcast;

use common::{desk_args, drain_events, fast_config, queue_stats, spawn_queue, tickets};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_three_desks_serve_every_ticket() -> Result<(), Box<dyn Error>> {
    let office = Office::new(fast_config(3, 25, 100))?;
    assert_eq!(office.config().ticket_count, 25);
    let report = office.run().await?;

    assert_eq!(report.issued, 25);
    assert_eq!(report.total_served(), 25);
    assert_eq!(report.served_tickets(), tickets(100, 25));
    assert!(report.failures.is_empty());

    let mut closed = report.closed_desks.clone();
    closed.sort();
    assert_eq!(closed, vec![DeskId(0), DeskId(1), DeskId(2)]);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_single_desk_serves_in_ticket_order() -> Result<(), Box<dyn Error>> {
    let report = Office::new(fast_config(1, 5, 1))?.run().await?;

    assert_eq!(report.served.len(), 1);
    assert_eq!(report.served[&DeskId(0)], tickets(1, 5));
    assert_eq!(report.closed_desks, vec![DeskId(0)]);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_each_desk_serves_increasing_tickets() -> Result<(), Box<dyn Error>> {
    for desk_count in 1..=4 {
        let report = Office::new(fast_config(desk_count, 30, 0))?.run().await?;

        assert_eq!(report.served_tickets(), tickets(0, 30));
        for (desk_id, served) in &report.served {
            assert!(
                served.windows(2).all(|w| w[0] < w[1]),
                "{} served out of order: {:?}",
                desk_id,
                served
            );
        }
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_desks_close_only_on_drained_queue() -> Result<(), Box<dyn Error>> {
    let office = Office::new(fast_config(3, 20, 10))?;
    let mut rx = office.subscribe();
    office.run().await?;

    let events = drain_events(&mut rx);

    let office_closed = events
        .iter()
        .position(|e| matches!(e, OfficeEvent::OfficeClosed { .. }))
        .ok_or("office never closed")?;
    let desk_closures: Vec<_> = events
        .iter()
        .enumerate()
        .filter(|(_, e)| matches!(e, OfficeEvent::DeskClosed { .. }))
        .collect();

    assert_eq!(desk_closures.len(), 3);
    for (index, event) in desk_closures {
        assert!(index > office_closed);
        assert_eq!(event.queue_size(), Some(0));
    }

    let mut assigned: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, OfficeEvent::CustomerAssigned { .. }))
        .filter_map(|e| e.ticket())
        .collect();
    assigned.sort();
    assert_eq!(assigned, tickets(10, 20));

    let opened = events
        .iter()
        .filter(|e| matches!(e, OfficeEvent::DeskOpened { .. }))
        .count();
    assert_eq!(opened, 3);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_short_waits_never_drop_customers() -> Result<(), Box<dyn Error>> {
    let mut config = fast_config(2, 6, 1);
    config.wait_timeout_ms = 2;
    config.arrival_interval = DurationRange::new(10, 20);

    let report = Office::new(config)?.run().await?;
    assert_eq!(report.served_tickets(), tickets(1, 6));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_empty_day_closes_every_desk() -> Result<(), Box<dyn Error>> {
    let config = fast_config(3, 0, 100);
    let (event_tx, mut rx) = broadcast::channel(64);

    let report = start_office(config, Arc::new(SimulatedService), event_tx).await?;

    assert_eq!(report.issued, 0);
    assert_eq!(report.total_served(), 0);
    assert_eq!(report.closed_desks.len(), 3);

    let events = drain_events(&mut rx);
    assert!(
        !events
            .iter()
            .any(|e| matches!(e, OfficeEvent::CustomerAssigned { .. }))
    );
    Ok(())
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let result = Office::new(fast_config(0, 5, 1));
    assert!(matches!(
        result,
        Err(OfficeError::Config(ConfigError::NoDesks))
    ));

    let result = Office::new(fast_config(2, 0, 1));
    assert!(matches!(
        result,
        Err(OfficeError::Config(ConfigError::NoTickets))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_failing_desk_is_reported() -> Result<(), Box<dyn Error>> {
    let handler = FnHandler::new(
        |_desk: DeskId, customer: Customer, service_time: Duration| -> HandlerFuture {
            Box::pin(async move {
                tokio::time::sleep(service_time).await;
                if customer.ticket() == TicketNumber(3) {
                    Err("counter jammed".to_string())
                } else {
                    Ok(())
                }
            })
        },
    );
    let office = Office::new(fast_config(2, 6, 1))?.with_handler(handler);
    let mut rx = office.subscribe();

    match office.run().await {
        Err(OfficeError::DeskFailures { failures, report }) => {
            assert_eq!(failures.len(), 1);
            assert!(failures[0].error.contains("counter jammed"));
            assert!(!report.served_tickets().contains(&TicketNumber(3)));
            assert_eq!(report.total_served(), 5);
            assert_eq!(report.closed_desks.len(), 1);
            assert!(!report.closed_desks.contains(&failures[0].desk_id));
        }
        other => panic!("expected a desk failure, got {:?}", other),
    }

    let events = drain_events(&mut rx);
    assert!(
        events
            .iter()
            .any(|e| matches!(e, OfficeEvent::DeskFailed { .. }))
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_issuer_fills_queue_then_closes() -> Result<(), Box<dyn Error>> {
    let queue = spawn_queue().await?;
    let args = IssuerArgs {
        first_ticket: TicketNumber(50),
        ticket_count: 4,
        arrival_interval: DurationRange::fixed(1),
        queue: queue.clone(),
        office: None,
        seed: Some(1),
    };
    let (_issuer, issuer_handle) = Actor::spawn(None, IssuerActor, args).await?;
    issuer_handle.await?;

    let stats = queue_stats(&queue).await?;
    assert_eq!(stats.pending, 4);
    assert_eq!(stats.pushed, 4);
    assert!(!stats.open);
    assert!(!stats.is_drained());

    queue.stop(None);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_stopped_issuer_still_closes_office() -> Result<(), Box<dyn Error>> {
    let queue = spawn_queue().await?;
    let args = IssuerArgs {
        first_ticket: TicketNumber(1),
        ticket_count: 1000,
        arrival_interval: DurationRange::fixed(20),
        queue: queue.clone(),
        office: None,
        seed: Some(2),
    };
    let (issuer, issuer_handle) = Actor::spawn(None, IssuerActor, args).await?;

    tokio::time::sleep(Duration::from_millis(50)).await;
    issuer.stop(Some("closing early".to_string()));
    issuer_handle.await?;

    let stats = queue_stats(&queue).await?;
    assert!(!stats.open);
    assert!(stats.pushed >= 1 && stats.pushed < 1000);

    let (_desk, desk_handle) = Actor::spawn(None, DeskActor, desk_args(&queue, 1, 10)).await?;
    desk_handle.await?;

    let stats = queue_stats(&queue).await?;
    assert_eq!(stats.popped, stats.pushed);
    assert!(stats.is_drained());

    queue.stop(None);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_failed_issuer_still_closes_office() -> Result<(), Box<dyn Error>> {
    // Only two ticket numbers fit below i64::MAX, so the issuer fails on the third.
    let config = fast_config(2, 5, i64::MAX - 1);
    let (event_tx, mut rx) = broadcast::channel(64);

    match start_office(config, Arc::new(SimulatedService), event_tx).await {
        Err(OfficeError::Incomplete {
            expected,
            served,
            report,
        }) => {
            assert_eq!(expected, 5);
            assert_eq!(served, 2);
            assert_eq!(report.issued, 2);
            assert_eq!(
                report.served_tickets(),
                vec![TicketNumber(i64::MAX - 1), TicketNumber(i64::MAX)]
            );
            assert_eq!(report.closed_desks.len(), 2);
            assert!(report.failures.is_empty());
        }
        other => panic!("expected an incomplete day, got {:?}", other),
    }

    let events = drain_events(&mut rx);
    assert!(
        events
            .iter()
            .any(|e| matches!(e, OfficeEvent::OfficeClosed { .. }))
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_desk_drains_queue_before_closing() -> Result<(), Box<dyn Error>> {
    let queue = spawn_queue().await?;
    let (desk, desk_handle) = Actor::spawn(None, DeskActor, desk_args(&queue, 1, 10)).await?;

    let status = desk_status(&desk).await?;
    assert_eq!(status, DeskState::Waiting);

    for ticket in [2, 1] {
        queue.send_message(QueueMessage::Push {
            customer: Customer::new(TicketNumber(ticket)),
        })?;
    }
    queue.send_message(QueueMessage::Close { issued: 2 })?;
    desk_handle.await?;

    let stats = queue_stats(&queue).await?;
    assert_eq!(stats.popped, 2);
    assert!(stats.is_drained());

    queue.stop(None);
    Ok(())
}

async fn desk_status(desk: &ActorRef<DeskMessage>) -> Result<DeskState, Box<dyn Error>> {
    let result = ractor::rpc::call(
        desk,
        |reply| DeskMessage::Status { reply },
        Some(Duration::from_millis(200)),
    )
    .await?;
    match result {
        CallResult::Success(state) => Ok(state),
        _ => Err("desk did not answer its status".into()),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_status_reports_customer_being_served() -> Result<(), Box<dyn Error>> {
    let queue = spawn_queue().await?;
    // Parked on the queue far longer than the status deadline.
    let (desk, desk_handle) = Actor::spawn(None, DeskActor, desk_args(&queue, 600, 5000)).await?;

    assert_eq!(desk_status(&desk).await?, DeskState::Waiting);

    queue.send_message(QueueMessage::Push {
        customer: Customer::new(TicketNumber(5)),
    })?;

    let mut observed = Vec::new();
    for _ in 0..20 {
        let status = desk_status(&desk).await?;
        observed.push(status);
        if status == (DeskState::Serving { ticket: TicketNumber(5) }) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(
        observed.last(),
        Some(&DeskState::Serving {
            ticket: TicketNumber(5)
        }),
        "status history: {:?}",
        observed
    );

    queue.send_message(QueueMessage::Close { issued: 1 })?;
    desk_handle.await?;

    let stats = queue_stats(&queue).await?;
    assert_eq!(stats.popped, 1);
    queue.stop(None);
    Ok(())
}

/// Queue stand-in that answers the first request long after the desk's
/// bounded wait, then reports the office closed.
struct LateQueue;

impl Actor for LateQueue {
    type Msg = QueueMessage;
    type State = bool;
    type Arguments = ();

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        _args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        Ok(false)
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        answered: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        if let QueueMessage::TryPop { wait, reply, .. } = message {
            if *answered {
                let _ = reply.send(Pop::Closed { queue_size: 0 });
                return Ok(());
            }
            tokio::time::sleep(wait + Duration::from_millis(800)).await;
            if reply.send(Pop::Customer(Customer::new(TicketNumber(7)))).is_err() {
                return Err("desk dropped a customer".into());
            }
            *answered = true;
        }
        Ok(())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_late_queue_answer_is_still_served() -> Result<(), Box<dyn Error>> {
    let (queue, _queue_handle) = Actor::spawn(None, LateQueue, ()).await?;
    let (event_tx, mut rx) = broadcast::channel(64);
    let args = DeskArgs {
        event_tx: Some(event_tx),
        ..desk_args(&queue, 1, 20)
    };
    let (_desk, desk_handle) = Actor::spawn(None, DeskActor, args).await?;
    desk_handle.await?;

    let events = drain_events(&mut rx);
    assert!(events.iter().any(|e| matches!(
        e,
        OfficeEvent::ServiceCompleted { ticket, .. } if *ticket == TicketNumber(7)
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        OfficeEvent::DeskClosed { served: 1, .. }
    )));

    queue.stop(None);
    Ok(())
}
