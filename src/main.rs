//! a3s-bridge binary
//!
//! ```text
//! a3s-bridge [serve]         WebSocket bridge for the web agents
//! a3s-bridge chat [agent]    terminal chat (default: research_assistant)
//! ```

use a3s_bridge::agents::{AgentCatalog, DEFAULT_CHAT_AGENT};
use a3s_bridge::bridge::{self, AppState, TerminalBridge};
use a3s_bridge::client::{AnthropicClient, ScriptedClient};
use a3s_bridge::session::{with_session, AgentClient};
use a3s_bridge::{telemetry, BridgeConfig, ToolStore};
use anyhow::Context;
use std::sync::Arc;
use tokio::io::BufReader;

const USAGE: &str = "Usage: a3s-bridge [serve | chat [agent]]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = BridgeConfig::load().context("Failed to load configuration")?;
    telemetry::init(&config.logging)?;

    let store = ToolStore::open(&config.storage)
        .await
        .context("Failed to open tool stores")?;

    let client: Arc<dyn AgentClient> = if config.anthropic.api_key.is_empty() {
        tracing::warn!("ANTHROPIC_API_KEY is not set; running offline with the echo client");
        Arc::new(ScriptedClient::echo())
    } else {
        Arc::new(AnthropicClient::new(config.anthropic.clone())?)
    };

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None | Some("serve") => {
            let state = AppState::new(AgentCatalog::web(&store, &config.storage), client);
            bridge::serve(&config.server.bind_addr(), state).await?;
        }
        Some("chat") => {
            let agent = args.get(1).map(String::as_str).unwrap_or(DEFAULT_CHAT_AGENT);
            let catalog = AgentCatalog::standard(&store, &config.storage);
            let preset = catalog.get(agent).with_context(|| {
                format!("Unknown agent: {} (available: {})", agent, catalog.ids().join(", "))
            })?;
            let persona = preset.persona.clone();

            with_session(client.as_ref(), preset.config.clone(), |session| {
                Box::pin(async move {
                    let stdin = BufReader::new(tokio::io::stdin());
                    TerminalBridge::new(&persona, tokio::io::stdout())
                        .run(session, stdin)
                        .await
                })
            })
            .await?;
        }
        Some("help" | "--help" | "-h") => println!("{}", USAGE),
        Some(other) => anyhow::bail!("Unknown command: {}\n{}", other, USAGE),
    }

    Ok(())
}
