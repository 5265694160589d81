//! Queue actor owning the waiting customers and the office-open flag.
//!
//! The heap and the flag live in one actor, so every push, pop and closure
//! is observed in a single order and a desk can never miss the transition
//! from "queue empty" to "office closed".

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use chrono::Utc;
use office_core::{Customer, DeskId, OfficeEvent, QueueStats};
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use tokio::sync::broadcast;

use crate::messages::{Pop, QueueMessage};

/// Wrapper for priority queue ordering (lowest ticket first).
#[derive(Debug, Clone, Copy)]
struct PriorityCustomer {
    customer: Customer,
}

impl PartialEq for PriorityCustomer {
    fn eq(&self, other: &Self) -> bool {
        self.customer.ticket() == other.customer.ticket()
    }
}

impl Eq for PriorityCustomer {}

impl PartialOrd for PriorityCustomer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PriorityCustomer {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse so the smallest ticket is on top.
        other.customer.ticket().cmp(&self.customer.ticket())
    }
}

/// A desk parked on an empty queue.
struct Waiter {
    id: u64,
    desk_id: DeskId,
    reply: RpcReplyPort<Pop>,
}

/// State for the queue actor.
pub struct QueueActorState {
    pending: BinaryHeap<PriorityCustomer>,
    waiters: VecDeque<Waiter>,
    open: bool,
    next_waiter: u64,
    pushed: u64,
    popped: u64,
    /// Event broadcaster.
    event_tx: Option<broadcast::Sender<OfficeEvent>>,
}

impl QueueActorState {
    /// Create an empty, open queue.
    pub fn new() -> Self {
        Self {
            pending: BinaryHeap::new(),
            waiters: VecDeque::new(),
            open: true,
            next_waiter: 0,
            pushed: 0,
            popped: 0,
            event_tx: None,
        }
    }

    /// Set the event broadcaster.
    pub fn with_event_tx(mut self, tx: broadcast::Sender<OfficeEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    fn broadcast(&self, event: OfficeEvent) {
        if let Some(ref tx) = self.event_tx {
            let _ = tx.send(event);
        }
    }

    fn stats(&self) -> QueueStats {
        QueueStats {
            pending: self.pending.len(),
            pushed: self.pushed,
            popped: self.popped,
            waiting_desks: self.waiters.len(),
            open: self.open,
        }
    }

    /// Remove the lowest ticket on behalf of `desk_id`.
    fn pop_for(&mut self, desk_id: DeskId) -> Option<Customer> {
        let customer = self.pending.pop()?.customer;
        self.popped += 1;
        self.broadcast(OfficeEvent::CustomerAssigned {
            desk_id,
            ticket: customer.ticket(),
            queue_size: self.pending.len(),
            timestamp: Utc::now(),
        });
        Some(customer)
    }

    /// Serve parked desks while customers are available.
    fn hand_off(&mut self) {
        while !self.pending.is_empty() {
            let Some(waiter) = self.waiters.pop_front() else {
                break;
            };
            if waiter.reply.is_closed() {
                continue;
            }
            let Some(&top) = self.pending.peek() else {
                break;
            };
            if waiter.reply.send(Pop::Customer(top.customer)).is_err() {
                // Desk went away between the check and the send.
                continue;
            }
            let _ = self.pop_for(waiter.desk_id);
        }
    }

    /// Tell every parked desk the office is closed and drained.
    fn release_waiters(&mut self) {
        let queue_size = self.pending.len();
        for waiter in self.waiters.drain(..) {
            let _ = waiter.reply.send(Pop::Closed { queue_size });
        }
    }
}

impl Default for QueueActorState {
    fn default() -> Self {
        Self::new()
    }
}

/// Queue actor that orders customers by ticket number.
pub struct QueueActor;

impl Actor for QueueActor {
    type Msg = QueueMessage;
    type State = QueueActorState;
    type Arguments = QueueActorState;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        tracing::debug!("Starting ticket queue");
        Ok(args)
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            QueueMessage::Push { customer } => {
                if !state.open {
                    tracing::warn!(
                        "Customer {} arrived after closing; queuing anyway",
                        customer.ticket()
                    );
                }
                state.pending.push(PriorityCustomer { customer });
                state.pushed += 1;

                state.broadcast(OfficeEvent::CustomerIssued {
                    ticket: customer.ticket(),
                    queue_size: state.pending.len(),
                    timestamp: Utc::now(),
                });
                state.hand_off();
            }

            QueueMessage::TryPop {
                desk_id,
                wait,
                reply,
            } => {
                if let Some(&top) = state.pending.peek() {
                    if reply.send(Pop::Customer(top.customer)).is_ok() {
                        let _ = state.pop_for(desk_id);
                    } else {
                        tracing::warn!("{} dropped its request", desk_id);
                    }
                    return Ok(());
                }

                if !state.open {
                    let _ = reply.send(Pop::Closed { queue_size: 0 });
                    return Ok(());
                }

                let id = state.next_waiter;
                state.next_waiter += 1;
                state.waiters.push_back(Waiter { id, desk_id, reply });
                let _ = myself.send_after(wait, move || QueueMessage::WaitExpired { waiter: id });
            }

            QueueMessage::WaitExpired { waiter } => {
                if let Some(pos) = state.waiters.iter().position(|w| w.id == waiter)
                    && let Some(expired) = state.waiters.remove(pos)
                {
                    let _ = expired.reply.send(Pop::Empty);
                }
            }

            QueueMessage::Size { reply } => {
                let _ = reply.send(state.pending.len());
            }

            QueueMessage::GetStats { reply } => {
                let _ = reply.send(state.stats());
            }

            QueueMessage::Close { issued } => {
                if !state.open {
                    tracing::debug!("Office already closed");
                    return Ok(());
                }
                state.open = false;
                tracing::info!(
                    "Office closed after {} tickets, {} still queued",
                    issued,
                    state.pending.len()
                );

                state.broadcast(OfficeEvent::OfficeClosed {
                    issued,
                    queue_size: state.pending.len(),
                    timestamp: Utc::now(),
                });
                if state.pending.is_empty() {
                    state.release_waiters();
                }
            }
        }

        Ok(())
    }
}
