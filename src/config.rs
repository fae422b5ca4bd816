//! Bridge configuration
//!
//! Configuration is layered: built-in defaults, then an optional JSON file
//! named by `A3S_BRIDGE_CONFIG`, then individual environment overrides.

use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Environment variable naming an optional JSON config file
pub const CONFIG_PATH_ENV: &str = "A3S_BRIDGE_CONFIG";

/// A string wrapper that redacts its value in Debug and Display output.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Access the secret value (only for HTTP headers)
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl std::fmt::Display for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Main bridge configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// WebSocket server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// On-disk tool store locations
    #[serde(default)]
    pub storage: StorageConfig,

    /// Anthropic Messages API configuration
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// WebSocket server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Storage locations
///
/// Everything the tools write lives under `data_dir`:
/// ```text
/// {data_dir}/
///   notes/                        # one markdown file per note
///   todos.json                    # ordered to-do array
///   briefings/                    # one markdown file per briefing
///   support/tickets/              # one JSON file per ticket
///   support/conversation_log.json # ordered log array
/// ```
///
/// Tickets, briefings and the conversation log can be moved elsewhere with
/// their optional overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    /// Read-only markdown documents searched by the support agent
    pub knowledge_base_dir: PathBuf,
    /// CSV files referenced by the retail analyzer prompt
    pub sample_data_dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickets_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub briefings_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_log: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./assistant_data"),
            knowledge_base_dir: PathBuf::from("./data/knowledge_base"),
            sample_data_dir: PathBuf::from("./data/sample_data"),
            tickets_dir: None,
            briefings_dir: None,
            conversation_log: None,
        }
    }
}

impl StorageConfig {
    /// Storage rooted at `data_dir`, with the knowledge base and sample data beside it
    pub fn rooted_at(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref().to_path_buf();
        Self {
            knowledge_base_dir: data_dir.join("knowledge_base"),
            sample_data_dir: data_dir.join("sample_data"),
            data_dir,
            tickets_dir: None,
            briefings_dir: None,
            conversation_log: None,
        }
    }

    pub fn notes_dir(&self) -> PathBuf {
        self.data_dir.join("notes")
    }

    pub fn todos_file(&self) -> PathBuf {
        self.data_dir.join("todos.json")
    }

    pub fn briefings_dir(&self) -> PathBuf {
        self.briefings_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("briefings"))
    }

    pub fn tickets_dir(&self) -> PathBuf {
        self.tickets_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("support").join("tickets"))
    }

    pub fn conversation_log(&self) -> PathBuf {
        self.conversation_log
            .clone()
            .unwrap_or_else(|| self.data_dir.join("support").join("conversation_log.json"))
    }
}

/// Anthropic Messages API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnthropicConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub max_tokens: usize,
    /// Upper bound on tool-use round trips within one turn
    pub max_tool_rounds: usize,
    /// Model alias -> concrete model id
    pub models: HashMap<String, String>,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        let models = [
            ("haiku", "claude-3-5-haiku-latest"),
            ("sonnet", "claude-3-7-sonnet-latest"),
            ("opus", "claude-3-opus-latest"),
        ]
        .into_iter()
        .map(|(alias, id)| (alias.to_string(), id.to_string()))
        .collect();

        Self {
            api_key: SecretString::default(),
            base_url: "https://api.anthropic.com".to_string(),
            max_tokens: 8192,
            max_tool_rounds: 16,
            models,
        }
    }
}

impl AnthropicConfig {
    /// Resolve a model alias; unknown names pass through unchanged
    pub fn resolve_model(&self, name: &str) -> String {
        self.models
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl BridgeConfig {
    /// Load from the optional config file and the process environment
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a JSON config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BridgeError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| BridgeError::Config(format!("Invalid config JSON: {}", e)))
    }

    /// Apply environment overrides through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("A3S_BRIDGE_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("A3S_BRIDGE_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| BridgeError::Config(format!("Invalid port: {}", port)))?;
        }
        if let Some(dir) = lookup("A3S_BRIDGE_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("A3S_BRIDGE_KB_DIR") {
            self.storage.knowledge_base_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("A3S_BRIDGE_SAMPLE_DATA_DIR") {
            self.storage.sample_data_dir = PathBuf::from(dir);
        }
        if let Some(key) = lookup("ANTHROPIC_API_KEY") {
            self.anthropic.api_key = SecretString::new(key);
        }
        if let Some(url) = lookup("ANTHROPIC_BASE_URL") {
            self.anthropic.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(level) = lookup("A3S_BRIDGE_LOG") {
            self.logging.level = level;
        }
        if let Some(json) = lookup("A3S_BRIDGE_LOG_JSON") {
            self.logging.json = matches!(json.as_str(), "1" | "true" | "yes");
        }
        Ok(())
    }
}
