use super::PubSubTransport;
use crate::error::{ClientError, Result};
use async_trait::async_trait;
use cdm::PubSubMessage;
use tokio::sync::mpsc;

/// Channel-backed transport.
pub struct MemoryTransport {
    outgoing: mpsc::UnboundedSender<PubSubMessage>,
    incoming: mpsc::UnboundedReceiver<PubSubMessage>,
}

/// The other end of a [`MemoryTransport`]: sees what the dashboard sent and
/// injects server pushes.
pub struct MemoryPeer {
    pub sent: mpsc::UnboundedReceiver<PubSubMessage>,
    pub push: mpsc::UnboundedSender<PubSubMessage>,
}

impl MemoryPeer {
    /// Everything sent so far, without waiting.
    pub fn drain(&mut self) -> Vec<PubSubMessage> {
        let mut messages = Vec::new();
        while let Ok(message) = self.sent.try_recv() {
            messages.push(message);
        }
        messages
    }
}

impl MemoryTransport {
    pub fn pair() -> (MemoryTransport, MemoryPeer) {
        let (outgoing, sent) = mpsc::unbounded_channel();
        let (push, incoming) = mpsc::unbounded_channel();
        (MemoryTransport { outgoing, incoming }, MemoryPeer { sent, push })
    }
}

#[async_trait]
impl PubSubTransport for MemoryTransport {
    async fn send(&mut self, message: &PubSubMessage) -> Result<()> {
        self.outgoing
            .send(message.clone())
            .map_err(|_| ClientError::Closed)
    }

    async fn recv(&mut self) -> Result<PubSubMessage> {
        self.incoming.recv().await.ok_or(ClientError::Closed)
    }

    async fn close(&mut self) -> Result<()> {
        self.incoming.close();
        Ok(())
    }
}
