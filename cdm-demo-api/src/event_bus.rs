//! # Event Bus
//!
//! Fan-out of pub/sub messages to every connected websocket session. Each
//! session keeps its own topic set and drops messages it did not ask for.

use cdm::PubSubMessage;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 100;

/// A wrapper around a tokio broadcast channel carrying [`PubSubMessage`]s.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PubSubMessage>,
}

impl EventBus {
    /// Creates a new EventBus.
    ///
    /// Slow receivers skip old messages (see [`broadcast::error::RecvError::Lagged`]).
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publishes a message to all sessions.
    pub fn publish(&self, message: PubSubMessage) {
        // No sessions connected is not an error.
        let _ = self.sender.send(message);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PubSubMessage> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
