//! Agent Session
//!
//! One bound conversation with the agent client. A session owns its
//! connection and an immutable [`AgentSessionConfig`]; callers alternate
//! [`AgentSession::send`] and [`AgentSession::events`], draining each turn's
//! events down to the terminal `Result` before sending the next turn.
//!
//! ```rust,no_run
//! use a3s_bridge::client::ScriptedClient;
//! use a3s_bridge::session::{AgentSession, AgentSessionConfig, SessionEvent};
//! use futures::StreamExt;
//! use std::sync::Arc;
//!
//! # async fn example() -> a3s_bridge::Result<()> {
//! let client = ScriptedClient::echo();
//! let config = Arc::new(AgentSessionConfig::builder().model("haiku").build());
//! let mut session = AgentSession::open(&client, config).await?;
//!
//! session.send("hello").await?;
//! {
//!     let events = session.events();
//!     futures::pin_mut!(events);
//!     while let Some(event) = events.next().await {
//!         if let SessionEvent::Assistant { text } = event? {
//!             println!("{}", text);
//!         }
//!     }
//! }
//! session.close().await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod events;

pub use client::{AgentClient, AgentConnection};
pub use config::{
    AgentSessionConfig, AgentSessionConfigBuilder, PermissionMode, SubagentDefinition,
    DELEGATE_TOOL,
};
pub use events::{ClientMessage, ContentBlock, ResultSubtype, SessionEvent};

use crate::error::{BridgeError, Result};
use async_stream::stream;
use futures::future::BoxFuture;
use futures::{FutureExt, Stream, StreamExt};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::Instrument;

/// A live conversation bound to one configuration
pub struct AgentSession {
    id: String,
    config: Arc<AgentSessionConfig>,
    connection: Box<dyn AgentConnection>,
    turn_open: bool,
}

impl AgentSession {
    /// Connect through `client` with a fixed configuration
    pub async fn open(client: &dyn AgentClient, config: Arc<AgentSessionConfig>) -> Result<Self> {
        let connection = client.connect(config.clone()).await?;
        let id = uuid::Uuid::new_v4().to_string();
        tracing::info!(
            session_id = %id,
            client = client.name(),
            model = %config.model,
            tools = config.allowed_tools.len(),
            agents = config.agents.len(),
            "Agent session opened"
        );
        Ok(Self {
            id,
            config,
            connection,
            turn_open: false,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &AgentSessionConfig {
        &self.config
    }

    /// Whether a sent turn still has undrained events
    pub fn turn_in_progress(&self) -> bool {
        self.turn_open
    }

    /// Submit one user turn
    ///
    /// Fails with [`BridgeError::TurnInProgress`] until the previous turn's
    /// events reached their terminal `Result`.
    pub async fn send(&mut self, turn: &str) -> Result<()> {
        if self.turn_open {
            return Err(BridgeError::TurnInProgress);
        }
        let span = tracing::info_span!(
            "a3s.session.turn",
            "a3s.session.id" = %self.id,
            "a3s.session.model" = %self.config.model,
            "a3s.session.turn_chars" = turn.chars().count(),
        );
        async {
            self.connection.query(turn).await?;
            self.turn_open = true;
            Ok(())
        }
        .instrument(span)
        .await
    }

    /// Events of the most recently sent turn
    ///
    /// Yields assistant text, tool use and delegate events, then exactly one
    /// `Result`. A rate-limit fault becomes a quiet `Result` with subtype
    /// `RateLimited`; any other fault is yielded once as `Err` and ends the
    /// turn. Empty when no turn is open.
    pub fn events(&mut self) -> impl Stream<Item = Result<SessionEvent>> + Send + '_ {
        stream! {
            while self.turn_open {
                match self.connection.receive().await {
                    Ok(Some(ClientMessage::Assistant { content })) => {
                        for event in content.into_iter().filter_map(SessionEvent::from_block) {
                            yield Ok(event);
                        }
                    }
                    Ok(Some(ClientMessage::Result { subtype, error })) => {
                        self.turn_open = false;
                        tracing::debug!(session_id = %self.id, ?subtype, "Turn finished");
                        yield Ok(SessionEvent::Result { subtype, error });
                    }
                    Ok(None) => {
                        self.turn_open = false;
                        yield Ok(SessionEvent::Result {
                            subtype: ResultSubtype::Success,
                            error: None,
                        });
                    }
                    Err(e) if e.is_rate_limit() => {
                        self.turn_open = false;
                        tracing::info!(session_id = %self.id, error = %e, "Rate limit ended the turn");
                        yield Ok(SessionEvent::Result {
                            subtype: ResultSubtype::RateLimited,
                            error: None,
                        });
                    }
                    Err(e) => {
                        self.turn_open = false;
                        tracing::warn!(session_id = %self.id, error = %e, "Agent client fault");
                        yield Err(e);
                    }
                }
            }
        }
    }

    /// Send a turn and drain it
    ///
    /// A client fault is returned as `Err`; the session stays usable.
    pub async fn ask(&mut self, turn: &str) -> Result<Vec<SessionEvent>> {
        self.send(turn).await?;
        let mut collected = Vec::new();
        let events = self.events();
        futures::pin_mut!(events);
        while let Some(event) = events.next().await {
            collected.push(event?);
        }
        Ok(collected)
    }

    /// Release the connection
    pub async fn close(mut self) -> Result<()> {
        tracing::info!(session_id = %self.id, "Agent session closed");
        self.connection.close().await
    }
}

impl std::fmt::Debug for AgentSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentSession")
            .field("id", &self.id)
            .field("model", &self.config.model)
            .field("turn_open", &self.turn_open)
            .finish()
    }
}

/// Open a session, run `f` on it, and close it on every exit path
///
/// A panic inside `f` is resumed after the session is closed.
pub async fn with_session<T, F>(
    client: &dyn AgentClient,
    config: Arc<AgentSessionConfig>,
    f: F,
) -> Result<T>
where
    F: for<'a> FnOnce(&'a mut AgentSession) -> BoxFuture<'a, Result<T>>,
{
    let mut session = AgentSession::open(client, config).await?;
    let outcome = AssertUnwindSafe(f(&mut session)).catch_unwind().await;
    let closed = session.close().await;
    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(panic) => {
            if let Err(e) = closed {
                tracing::warn!(error = %e, "Failed to close session after panic");
            }
            std::panic::resume_unwind(panic);
        }
    };
    match (outcome, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), closed) => {
            if let Err(close_err) = closed {
                tracing::warn!(error = %close_err, "Failed to close session after error");
            }
            Err(e)
        }
    }
}
