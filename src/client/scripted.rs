//! Deterministic agent client
//!
//! Replays queued turns step by step. Tool calls in a script go through the
//! session's hooks and registries exactly like a live client would, so the
//! whole path below the model can be exercised without network access. When
//! the queue is empty the client either echoes the prompt or just succeeds.

use super::run_tool;
use crate::error::{BridgeError, Result};
use crate::session::{AgentClient, AgentConnection, AgentSessionConfig, ClientMessage, ContentBlock};
use crate::tools::ToolResult;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

/// One step of a scripted turn
#[derive(Debug, Clone)]
pub enum ScriptStep {
    /// Yield this message as-is
    Message(ClientMessage),
    /// Announce a tool call, then run it through hooks and registries
    ToolCall {
        name: String,
        input: serde_json::Value,
    },
    /// Fail `receive` with an agent client fault
    Fault(String),
    /// Fail `receive` with a rate-limit signal
    RateLimit,
}

impl ScriptStep {
    pub fn text(text: impl Into<String>) -> Self {
        ScriptStep::Message(ClientMessage::assistant_text(text))
    }

    pub fn tool_call(name: impl Into<String>, input: serde_json::Value) -> Self {
        ScriptStep::ToolCall {
            name: name.into(),
            input,
        }
    }

    pub fn success() -> Self {
        ScriptStep::Message(ClientMessage::success())
    }
}

#[derive(Debug, Default)]
struct Shared {
    turns: VecDeque<Vec<ScriptStep>>,
    prompts: Vec<String>,
    tool_results: Vec<(String, ToolResult)>,
    closed: usize,
}

/// Agent client that replays queued turns
#[derive(Debug, Clone, Default)]
pub struct ScriptedClient {
    shared: Arc<Mutex<Shared>>,
    echo: bool,
}

impl ScriptedClient {
    /// Client that answers unscripted turns with a bare success
    pub fn new() -> Self {
        Self::default()
    }

    /// Client that answers unscripted turns by echoing the prompt
    pub fn echo() -> Self {
        Self {
            echo: true,
            ..Self::default()
        }
    }

    /// Queue the steps of the next turn, shared by every connection
    pub async fn push_turn(&self, steps: Vec<ScriptStep>) {
        self.shared.lock().await.turns.push_back(steps);
    }

    /// Prompts received so far, in order
    pub async fn prompts(&self) -> Vec<String> {
        self.shared.lock().await.prompts.clone()
    }

    /// Results of scripted tool calls, as `(tool name, result)`
    pub async fn tool_results(&self) -> Vec<(String, ToolResult)> {
        self.shared.lock().await.tool_results.clone()
    }

    pub async fn closed_connections(&self) -> usize {
        self.shared.lock().await.closed
    }
}

#[async_trait]
impl AgentClient for ScriptedClient {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn connect(&self, config: Arc<AgentSessionConfig>) -> Result<Box<dyn AgentConnection>> {
        Ok(Box::new(ScriptedConnection {
            shared: self.shared.clone(),
            echo: self.echo,
            session: config,
            steps: VecDeque::new(),
        }))
    }
}

struct ScriptedConnection {
    shared: Arc<Mutex<Shared>>,
    echo: bool,
    session: Arc<AgentSessionConfig>,
    steps: VecDeque<ScriptStep>,
}

#[async_trait]
impl AgentConnection for ScriptedConnection {
    async fn query(&mut self, prompt: &str) -> Result<()> {
        let mut shared = self.shared.lock().await;
        shared.prompts.push(prompt.to_string());
        let steps = match shared.turns.pop_front() {
            Some(steps) => steps,
            None if self.echo => vec![
                ScriptStep::text(format!("You said: {}", prompt)),
                ScriptStep::success(),
            ],
            None => vec![ScriptStep::success()],
        };
        self.steps = steps.into();
        Ok(())
    }

    async fn receive(&mut self) -> Result<Option<ClientMessage>> {
        let Some(step) = self.steps.pop_front() else {
            return Ok(None);
        };
        match step {
            ScriptStep::Message(message) => {
                if matches!(message, ClientMessage::Result { .. }) {
                    self.steps.clear();
                }
                Ok(Some(message))
            }
            ScriptStep::ToolCall { name, input } => {
                let result = if self.session.is_tool_allowed(&name) {
                    run_tool(&self.session, &name, &input).await
                } else {
                    ToolResult::error(format!("Tool {} is not available", name))
                };
                self.shared.lock().await.tool_results.push((name.clone(), result));
                Ok(Some(ClientMessage::Assistant {
                    content: vec![ContentBlock::tool_use(name, input)],
                }))
            }
            ScriptStep::Fault(message) => {
                self.steps.clear();
                Err(BridgeError::Client(message))
            }
            ScriptStep::RateLimit => {
                self.steps.clear();
                Err(BridgeError::RateLimited("rate_limit_event".to_string()))
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.shared.lock().await.closed += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::{HookPoint, ShellDisabled};
    use crate::tools::{ArgSpec, ToolCallArgs, ToolRegistry};
    use serde_json::json;

    #[tokio::test]
    async fn test_echo_fallback() {
        let client = ScriptedClient::echo();
        let mut conn = client
            .connect(Arc::new(AgentSessionConfig::default()))
            .await
            .unwrap();
        conn.query("hello").await.unwrap();

        assert_eq!(
            conn.receive().await.unwrap(),
            Some(ClientMessage::assistant_text("You said: hello"))
        );
        assert_eq!(conn.receive().await.unwrap(), Some(ClientMessage::success()));
        assert_eq!(conn.receive().await.unwrap(), None);
        assert_eq!(client.prompts().await, vec!["hello".to_string()]);
    }

    #[tokio::test]
    async fn test_fault_clears_rest_of_turn() {
        let client = ScriptedClient::new();
        client
            .push_turn(vec![ScriptStep::Fault("boom".into()), ScriptStep::text("never")])
            .await;
        let mut conn = client
            .connect(Arc::new(AgentSessionConfig::default()))
            .await
            .unwrap();
        conn.query("go").await.unwrap();

        assert!(matches!(conn.receive().await, Err(BridgeError::Client(_))));
        assert_eq!(conn.receive().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_tool_call_goes_through_hooks() {
        let mut shell = ToolRegistry::builtin();
        shell.register_fn(
            "Bash",
            "Run",
            vec![ArgSpec::required("command", "Command")],
            |_: ToolCallArgs| async { ToolResult::text("ran") },
        );
        let config = AgentSessionConfig::builder()
            .mcp_server_allowed(shell)
            .hook(HookPoint::PreToolUse, ShellDisabled::for_support_agent())
            .build();

        let client = ScriptedClient::new();
        client
            .push_turn(vec![
                ScriptStep::tool_call("Bash", json!({"command": "ls"})),
                ScriptStep::tool_call("Read", json!({"file_path": "x"})),
            ])
            .await;
        let mut conn = client.connect(Arc::new(config)).await.unwrap();
        conn.query("list files").await.unwrap();
        conn.receive().await.unwrap();
        conn.receive().await.unwrap();

        let results = client.tool_results().await;
        assert_eq!(results.len(), 2);
        assert_eq!(
            results[0].1.text_content(),
            "Shell commands are disabled for the support agent."
        );
        assert_eq!(results[1].1.text_content(), "Tool Read is not available");
    }
}
