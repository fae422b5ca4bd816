//! Agent client abstraction
//!
//! The agent client is the external collaborator that talks to the model.
//! It receives the whole session configuration and is responsible for
//! calling tool handlers and hooks while it works on a turn.

use super::config::AgentSessionConfig;
use super::events::ClientMessage;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Factory for agent connections
#[async_trait]
pub trait AgentClient: Send + Sync {
    /// Client name for logging
    fn name(&self) -> &str;

    /// Open a connection bound to `config`
    async fn connect(&self, config: Arc<AgentSessionConfig>) -> Result<Box<dyn AgentConnection>>;
}

/// One live connection to the agent
///
/// Turns are half-duplex: after `query`, the caller reads with `receive`
/// until a `ClientMessage::Result`, `Ok(None)` or an error. Any of those
/// ends the turn, and the connection must accept the next `query`.
#[async_trait]
pub trait AgentConnection: Send {
    /// Submit one user turn
    async fn query(&mut self, prompt: &str) -> Result<()>;

    /// Next message of the current turn; `None` when the turn has nothing more
    async fn receive(&mut self) -> Result<Option<ClientMessage>>;

    /// Release the connection
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
