//! Pub/sub transports.
//!
//! The dashboard only needs to send subscribe/unsubscribe frames and read
//! published messages; [`PubSubTransport`] hides whether that happens over a
//! websocket or an in-memory channel.

mod memory;
mod ws;

pub use memory::{MemoryPeer, MemoryTransport};
pub use ws::WsTransport;

use crate::error::Result;
use async_trait::async_trait;
use cdm::PubSubMessage;

#[async_trait]
pub trait PubSubTransport: Send {
    async fn send(&mut self, message: &PubSubMessage) -> Result<()>;

    /// Next message from the channel. Must be cancel safe: the dashboard
    /// races it against its refresh timer.
    async fn recv(&mut self) -> Result<PubSubMessage>;

    /// Ends the session. Further pushes are not delivered.
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
