//! Tracing subscriber setup
//!
//! Logs go to stderr so the terminal bridge keeps stdout for the conversation.

use crate::config::LoggingConfig;
use crate::error::{BridgeError, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directive when `RUST_LOG` is unset
pub fn default_directive(level: &str) -> String {
    format!("a3s_bridge={},tower_http=info", level)
}

/// Install the global subscriber
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directive(&config.level).into());

    let json_layer = config.json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
    });
    let text_layer = (!config.json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .map_err(|e| BridgeError::Config(format!("Failed to install tracing subscriber: {}", e)))
}
