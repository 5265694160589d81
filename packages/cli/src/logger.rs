//! Renders office events through `tracing`.

use office_core::OfficeEvent;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

/// Log level an event is rendered at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
}

pub fn level_of(event: &OfficeEvent) -> Level {
    match event {
        OfficeEvent::DeskFailed { .. } => Level::Warn,
        _ => Level::Info,
    }
}

/// Forward every event to the log until the office drops its sender.
pub fn spawn_event_logger(mut rx: broadcast::Receiver<OfficeEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => match level_of(&event) {
                    Level::Info => tracing::info!(target: "office", "{}", event.description()),
                    Level::Warn => tracing::warn!(target: "office", "{}", event.description()),
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Event logger fell behind, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
