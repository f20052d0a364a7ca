use super::PubSubTransport;
use crate::error::{ClientError, Result};
use async_trait::async_trait;
use cdm::PubSubMessage;
use futures::{SinkExt, StreamExt};
use log::{info, warn};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// JSON text frames over a websocket.
pub struct WsTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsTransport {
    pub async fn connect(url: &str) -> Result<Self> {
        let (stream, _) = connect_async(url).await?;
        info!("Connected to pub/sub channel at {}", url);
        Ok(Self { stream })
    }
}

#[async_trait]
impl PubSubTransport for WsTransport {
    async fn send(&mut self, message: &PubSubMessage) -> Result<()> {
        let text = serde_json::to_string(message)?;
        self.stream.send(Message::Text(text)).await?;
        Ok(())
    }

    async fn recv(&mut self) -> Result<PubSubMessage> {
        while let Some(frame) = self.stream.next().await {
            match frame? {
                Message::Text(text) => match serde_json::from_str(&text) {
                    Ok(message) => return Ok(message),
                    Err(e) => warn!("Ignoring malformed pub/sub frame: {}", e),
                },
                Message::Close(_) => return Err(ClientError::Closed),
                _ => {}
            }
        }
        Err(ClientError::Closed)
    }

    async fn close(&mut self) -> Result<()> {
        self.stream.close(None).await?;
        Ok(())
    }
}
