use thiserror::Error;

/// Errors raised while parsing domain values from text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Side other than `Buy` or `Sell`.
    #[error("Unknown trade side: {0}")]
    UnknownSide(String),

    #[error("Unknown trade state: {0}")]
    UnknownState(String),

    #[error("Unknown business event type: {0}")]
    UnknownBusinessEvent(String),

    /// Topic string not shaped like `/accounts/{id}/{trades|positions}`.
    #[error("Malformed topic: {0}")]
    MalformedTopic(String),

    /// A nested CDM value that is neither an object nor JSON-encoded text.
    #[error("Invalid CDM document: {0}")]
    InvalidDocument(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
