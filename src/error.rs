//! Error types for a3s-bridge

use thiserror::Error;

/// Marker the upstream agent SDK puts in benign end-of-turn faults
const RATE_LIMIT_MARKER: &str = "rate_limit_event";

/// Errors that can occur while bridging an agent session
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Malformed tool arguments or client input
    #[error("{0}")]
    InvalidInput(String),

    /// Lookup of an order, ticket, item or agent that does not exist
    #[error("{0}")]
    NotFound(String),

    /// Benign rate-limit signal that ends a turn early
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Any other fault raised by the agent client
    #[error("Agent client error: {0}")]
    Client(String),

    /// `send()` called before the previous turn's events were drained
    #[error("A turn is already in progress; drain its events before sending again")]
    TurnInProgress,

    /// WebSocket transport failure on the bridge side
    #[error("WebSocket error: {0}")]
    Socket(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP transport failure talking to the model API
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl BridgeError {
    /// Whether this fault is the benign end-of-turn signal that should be swallowed
    pub fn is_rate_limit(&self) -> bool {
        match self {
            BridgeError::RateLimited(_) => true,
            BridgeError::Client(msg) => msg.contains(RATE_LIMIT_MARKER),
            _ => false,
        }
    }
}

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;
