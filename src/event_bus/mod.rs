//! Wire-protocol event bus (spec.md §6).
//!
//! Grounded on `domain::actor`'s `broadcast::Sender<WorkflowEventEnvelope>`:
//! the same non-blocking, lossy-under-backpressure channel, generalized
//! from one workflow's internal event stream to the process-wide external
//! event families a client subscribes to.

pub mod event;

pub use event::Event;

use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 1024;

/// Process-wide fan-out of wire-protocol events. One bus per process;
/// every workflow's scheduler publishes onto it.
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish an event. Returns the number of live subscribers it reached;
    /// zero subscribers is not an error (nobody is listening yet).
    pub fn publish(&self, event: Event) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
#[path = "tests/bus_tests.rs"]
mod tests;
