//! Service step performed by a desk for one customer.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use office_core::{Customer, DeskId};

/// Result type for service handlers.
pub type HandlerResult = Result<(), String>;

/// Future type for async service handlers.
pub type HandlerFuture = Pin<Box<dyn Future<Output = HandlerResult> + Send>>;

/// How a desk serves one customer.
///
/// The desk draws `service_time` from its own generator and passes it in;
/// an `Err` is treated as a fault that terminates the desk.
pub trait ServiceHandler: Send + Sync + 'static {
    fn serve(&self, desk_id: DeskId, customer: Customer, service_time: Duration) -> HandlerFuture;
}

/// Default handler: the customer occupies the desk for the drawn duration.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedService;

impl ServiceHandler for SimulatedService {
    fn serve(&self, _desk_id: DeskId, _customer: Customer, service_time: Duration) -> HandlerFuture {
        Box::pin(async move {
            tokio::time::sleep(service_time).await;
            Ok(())
        })
    }
}

/// A simple function-based service handler.
pub struct FnHandler<F>
where
    F: Fn(DeskId, Customer, Duration) -> HandlerFuture + Send + Sync + 'static,
{
    handler: F,
}

impl<F> FnHandler<F>
where
    F: Fn(DeskId, Customer, Duration) -> HandlerFuture + Send + Sync + 'static,
{
    /// Create a new function-based handler.
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

impl<F> ServiceHandler for FnHandler<F>
where
    F: Fn(DeskId, Customer, Duration) -> HandlerFuture + Send + Sync + 'static,
{
    fn serve(&self, desk_id: DeskId, customer: Customer, service_time: Duration) -> HandlerFuture {
        (self.handler)(desk_id, customer, service_time)
    }
}
