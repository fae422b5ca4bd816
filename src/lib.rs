//! # a3s-bridge
//!
//! Agent Session Bridge: turns one conversation turn with a hosted agent
//! into a well-ordered stream of client-visible events, with tool dispatch,
//! safety hooks, and flat-file tool stores underneath.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use a3s_bridge::agents::AgentCatalog;
//! use a3s_bridge::client::ScriptedClient;
//! use a3s_bridge::config::BridgeConfig;
//! use a3s_bridge::session::AgentSession;
//! use a3s_bridge::store::ToolStore;
//!
//! # async fn example() -> a3s_bridge::Result<()> {
//! let config = BridgeConfig::default();
//! let store = ToolStore::open(&config.storage).await?;
//! let catalog = AgentCatalog::standard(&store, &config.storage);
//! let preset = catalog.get("customer_support").expect("preset");
//!
//! let client = ScriptedClient::echo();
//! let mut session = AgentSession::open(&client, preset.config.clone()).await?;
//! for event in session.ask("Where is ORD-002?").await? {
//!     println!("{:?}", event);
//! }
//! session.close().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **store**: notes, todos, tickets, briefings, conversation log, knowledge base
//! - **tools**: `Tool` trait and `ToolRegistry` (one registry per tool server)
//! - **hooks**: `HookSet` with PreToolUse/PostToolUse points and the shell `SafetyGate`
//! - **session**: `AgentSession` over an `AgentClient` connection
//! - **client**: Anthropic Messages API client and a scripted client
//! - **agents**: preset configurations and terminal personas
//! - **bridge**: terminal loop and axum WebSocket endpoint

pub mod agents;
pub mod bridge;
pub mod client;
pub mod config;
pub mod error;
pub mod hooks;
pub mod session;
pub mod store;
pub mod telemetry;
pub mod tools;

pub use agents::{AgentCatalog, AgentPreset, Persona};
pub use config::BridgeConfig;
pub use error::{BridgeError, Result};
pub use session::{
    with_session, AgentClient, AgentSession, AgentSessionConfig, ResultSubtype, SessionEvent,
};
pub use store::ToolStore;
pub use tools::{Tool, ToolRegistry, ToolResult};
