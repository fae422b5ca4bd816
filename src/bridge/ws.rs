//! WebSocket bridge
//!
//! One agent session per accepted socket, selected by the `agent_id` path
//! segment. Frames are JSON; see [`OutboundFrame`] and [`InboundFrame`].

use super::frames::{InboundFrame, OutboundFrame};
use crate::agents::AgentCatalog;
use crate::error::{BridgeError, Result};
use crate::session::{AgentClient, AgentSession};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state of the socket bridge
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<AgentCatalog>,
    pub client: Arc<dyn AgentClient>,
}

impl AppState {
    pub fn new(catalog: AgentCatalog, client: Arc<dyn AgentClient>) -> Self {
        Self {
            catalog: Arc::new(catalog),
            client,
        }
    }
}

/// Routes: `GET /api/health` and `GET /ws/:agent_id`
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/ws/:agent_id", get(ws_upgrade))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C
pub async fn serve(addr: &str, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        agents = ?state.catalog.ids(),
        "Session bridge listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    tracing::info!("Session bridge stopped");
    Ok(())
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

async fn ws_upgrade(
    ws: WebSocketUpgrade,
    Path(agent_id): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, agent_id, state))
}

type Sender = SplitSink<WebSocket, Message>;
type Receiver = SplitStream<WebSocket>;

async fn handle_socket(socket: WebSocket, agent_id: String, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    let Some(preset) = state.catalog.get(&agent_id) else {
        tracing::warn!(agent_id = %agent_id, "Socket opened for unknown agent");
        let _ = send_frame(&mut sender, &OutboundFrame::unknown_agent(&agent_id)).await;
        let _ = sender.send(Message::Close(None)).await;
        return;
    };

    let mut session = match AgentSession::open(state.client.as_ref(), preset.config.clone()).await
    {
        Ok(session) => session,
        Err(e) => {
            tracing::error!(agent_id = %agent_id, error = %e, "Failed to open agent session");
            let _ = send_frame(&mut sender, &OutboundFrame::error(e.to_string())).await;
            let _ = sender.send(Message::Close(None)).await;
            return;
        }
    };
    tracing::info!(agent_id = %agent_id, session_id = %session.id(), "Socket connected");

    if let Err(e) = relay(&mut session, &mut sender, &mut receiver).await {
        tracing::debug!(agent_id = %agent_id, error = %e, "Socket relay ended");
    }

    if let Err(e) = session.close().await {
        tracing::warn!(agent_id = %agent_id, error = %e, "Failed to close agent session");
    }
    tracing::info!(agent_id = %agent_id, "Socket disconnected");
}

/// Turn loop for one connection; returns when the client goes away
async fn relay(
    session: &mut AgentSession,
    sender: &mut Sender,
    receiver: &mut Receiver,
) -> Result<()> {
    send_frame(sender, &OutboundFrame::status("Connected")).await?;

    while let Some(Ok(message)) = receiver.next().await {
        let raw = match message {
            Message::Text(raw) => raw,
            Message::Close(_) => break,
            _ => continue,
        };
        let Some(turn) = InboundFrame::parse(&raw) else {
            tracing::debug!(session_id = %session.id(), "Ignoring malformed or empty frame");
            continue;
        };

        send_frame(sender, &OutboundFrame::status("Thinking...")).await?;
        if let Err(e) = session.send(&turn).await {
            tracing::warn!(session_id = %session.id(), error = %e, "Failed to submit turn");
            send_frame(sender, &OutboundFrame::error(e.to_string())).await?;
            send_frame(sender, &OutboundFrame::Done).await?;
            continue;
        }

        let events = session.events();
        futures::pin_mut!(events);
        while let Some(event) = events.next().await {
            let frame = match event {
                Ok(event) => match OutboundFrame::from_event(event) {
                    Some(frame) => frame,
                    None => continue,
                },
                Err(e) => OutboundFrame::error(e.to_string()),
            };
            send_frame(sender, &frame).await?;
        }

        send_frame(sender, &OutboundFrame::Done).await?;
    }
    Ok(())
}

async fn send_frame(sender: &mut Sender, frame: &OutboundFrame) -> Result<()> {
    sender
        .send(Message::Text(frame.to_json()))
        .await
        .map_err(|e| BridgeError::Socket(e.to_string()))
}
