//! Session Bridge
//!
//! Adapts an [`AgentSession`](crate::session::AgentSession) to a duplex
//! channel. Two renderings share the same contract: client input becomes
//! `send()` calls, and each turn's events are rendered until its `Result`.
//!
//! - [`TerminalBridge`]: interactive line loop with persona glyphs
//! - [`router`]: axum WebSocket endpoint `/ws/:agent_id` plus `/api/health`

mod frames;
mod terminal;
mod ws;

pub use frames::{InboundFrame, OutboundFrame};
pub use terminal::{is_quit, TerminalBridge, QUIT_TOKENS};
pub use ws::{router, serve, AppState};
