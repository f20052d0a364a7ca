use thiserror::Error;

/// Errors raised by the trade service client and the pub/sub transport.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response (connection refused, bad body...).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("{url} answered with status {status}")]
    Status { status: u16, url: String },

    /// Websocket failure.
    #[error("websocket error: {0}")]
    Socket(#[from] tokio_tungstenite::tungstenite::Error),

    /// A pub/sub frame could not be encoded or decoded.
    #[error("invalid pub/sub frame: {0}")]
    Frame(#[from] serde_json::Error),

    /// The pub/sub channel was closed by the peer.
    #[error("pub/sub channel closed")]
    Closed,
}

impl ClientError {
    /// True when the service was reached and answered with an error status.
    pub fn is_status(&self) -> bool {
        matches!(self, ClientError::Status { .. })
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
