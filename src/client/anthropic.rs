//! Anthropic Messages API client
//!
//! Each turn runs a tool-use loop: request, stream the assistant message to
//! the session, execute requested tools, feed the results back, repeat until
//! the model stops asking for tools or `max_tool_rounds` is hit. Calls to the
//! delegate tool run a nested loop with the subagent's prompt and model.

use super::{post_tool_use, pre_tool_use, run_tool};
use crate::config::AnthropicConfig;
use crate::error::{BridgeError, Result};
use crate::session::{
    AgentClient, AgentConnection, AgentSessionConfig, ClientMessage, ContentBlock,
    SubagentDefinition, DELEGATE_TOOL,
};
use crate::tools::{ToolDefinition, ToolResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::Instrument;

const API_VERSION: &str = "2023-06-01";

/// Agent client backed by the Anthropic Messages API
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    config: AnthropicConfig,
    http: reqwest::Client,
}

impl AnthropicClient {
    pub fn new(config: AnthropicConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(BridgeError::Config(
                "ANTHROPIC_API_KEY is not set".to_string(),
            ));
        }
        Ok(Self {
            config,
            http: reqwest::Client::new(),
        })
    }

    fn build_request(
        &self,
        model: &str,
        system: &str,
        messages: &[ApiMessage],
        tools: &[ToolDefinition],
    ) -> serde_json::Value {
        let mut request = serde_json::json!({
            "model": model,
            "max_tokens": self.config.max_tokens,
            "messages": messages,
        });

        if !system.is_empty() {
            request["system"] = serde_json::json!(system);
        }

        if !tools.is_empty() {
            request["tools"] = serde_json::json!(tools);
        }

        request
    }

    async fn complete(
        &self,
        model: &str,
        system: &str,
        messages: &[ApiMessage],
        tools: &[ToolDefinition],
    ) -> Result<ApiResponse> {
        let span = tracing::info_span!(
            "a3s.llm.completion",
            "a3s.llm.provider" = "anthropic",
            "a3s.llm.model" = %model,
            "a3s.llm.prompt_tokens" = tracing::field::Empty,
            "a3s.llm.completion_tokens" = tracing::field::Empty,
            "a3s.llm.stop_reason" = tracing::field::Empty,
        );
        async {
            let body = self.build_request(model, system, messages, tools);
            let url = format!("{}/v1/messages", self.config.base_url);

            let response = self
                .http
                .post(&url)
                .header("x-api-key", self.config.api_key.expose())
                .header("anthropic-version", API_VERSION)
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            let text = response.text().await?;
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(BridgeError::RateLimited(text));
            }
            if !status.is_success() {
                return Err(BridgeError::Client(format!(
                    "Anthropic API error ({}): {}",
                    status, text
                )));
            }

            let parsed: ApiResponse = serde_json::from_str(&text)?;
            let span = tracing::Span::current();
            span.record("a3s.llm.prompt_tokens", parsed.usage.input_tokens);
            span.record("a3s.llm.completion_tokens", parsed.usage.output_tokens);
            span.record(
                "a3s.llm.stop_reason",
                parsed.stop_reason.as_deref().unwrap_or("none"),
            );
            Ok(parsed)
        }
        .instrument(span)
        .await
    }
}

#[async_trait]
impl AgentClient for AnthropicClient {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn connect(&self, config: Arc<AgentSessionConfig>) -> Result<Box<dyn AgentConnection>> {
        let mut tools = config.available_tools();
        if config.can_delegate() {
            tools.push(delegate_definition(&config));
        }
        Ok(Box::new(AnthropicConnection {
            client: self.clone(),
            model: self.config.resolve_model(&config.model),
            session: config,
            tools,
            history: Vec::new(),
            pending: VecDeque::new(),
            turn: None,
        }))
    }
}

/// Progress of the turn in flight
#[derive(Debug, Clone, Copy)]
struct TurnState {
    /// History length before the turn's user message
    start: usize,
    rounds: usize,
}

struct AnthropicConnection {
    client: AnthropicClient,
    model: String,
    session: Arc<AgentSessionConfig>,
    /// Tools advertised to the top-level model
    tools: Vec<ToolDefinition>,
    history: Vec<ApiMessage>,
    pending: VecDeque<ClientMessage>,
    turn: Option<TurnState>,
}

impl AnthropicConnection {
    /// One request/response round; queues the assistant message and, at
    /// the end of the turn, the result
    async fn round(&mut self, state: TurnState) -> Result<Option<TurnState>> {
        let response = self
            .client
            .complete(
                &self.model,
                &self.session.system_prompt,
                &self.history,
                &self.tools,
            )
            .await?;

        let blocks: Vec<ApiBlock> = response.content.into_iter().filter(ApiBlock::is_known).collect();
        let calls: Vec<(String, String, serde_json::Value)> = blocks
            .iter()
            .filter_map(|b| match b {
                ApiBlock::ToolUse { id, name, input } => Some((id.clone(), name.clone(), input.clone())),
                _ => None,
            })
            .collect();

        let content: Vec<ContentBlock> = blocks.iter().filter_map(ApiBlock::to_content).collect();
        if !content.is_empty() {
            self.pending.push_back(ClientMessage::Assistant { content });
        }

        if calls.is_empty() || response.stop_reason.as_deref() != Some("tool_use") {
            // Every tool_use in history needs a tool_result after it
            if !calls.is_empty() {
                tracing::warn!(
                    unanswered = calls.len(),
                    stop_reason = ?response.stop_reason,
                    "Turn ended with unfinished tool calls"
                );
            }
            let answered = without_tool_use(blocks);
            if !answered.is_empty() {
                self.history.push(ApiMessage::assistant(answered));
            }
            self.pending.push_back(ClientMessage::success());
            return Ok(None);
        }
        self.history.push(ApiMessage::assistant(blocks));

        let mut results = Vec::with_capacity(calls.len());
        for (id, name, input) in calls {
            let result = self.dispatch(&name, &input).await;
            results.push(ApiBlock::tool_result(id, &result));
        }
        self.history.push(ApiMessage::user(results));

        Ok(Some(TurnState {
            rounds: state.rounds + 1,
            ..state
        }))
    }

    async fn dispatch(&self, name: &str, input: &serde_json::Value) -> ToolResult {
        if !self.tools.iter().any(|t| t.name == name) {
            return ToolResult::error(format!("Tool {} is not available", name));
        }
        if name != DELEGATE_TOOL {
            return run_tool(&self.session, name, input).await;
        }

        if let Some(blocked) = pre_tool_use(&self.session, name, input) {
            return blocked;
        }
        let agent = input
            .get("subagent_type")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        let prompt = input
            .get("prompt")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        let result = match self.session.agents.get(agent) {
            Some(definition) => match self.run_subagent(agent, definition, prompt).await {
                Ok(text) => ToolResult::text(text),
                Err(e) => ToolResult::error(format!("Subagent {} failed: {}", agent, e)),
            },
            None => ToolResult::error(format!("Unknown subagent: {}", agent)),
        };
        post_tool_use(&self.session, name, input);
        result
    }

    /// Nested tool-use loop for a delegated task; returns the final text
    async fn run_subagent(
        &self,
        agent: &str,
        definition: &SubagentDefinition,
        prompt: &str,
    ) -> Result<String> {
        tracing::info!(agent = %agent, model = %definition.model, "Delegating to subagent");
        let model = self.client.config.resolve_model(&definition.model);
        let tools: Vec<ToolDefinition> = self
            .session
            .builtin_tools
            .iter()
            .chain(self.session.mcp_servers.values())
            .flat_map(|registry| registry.definitions())
            .filter(|def| definition.tools.contains(&def.name))
            .collect();

        let mut messages = vec![ApiMessage::user(vec![ApiBlock::Text {
            text: prompt.to_string(),
        }])];

        for _ in 0..self.client.config.max_tool_rounds {
            let response = self
                .client
                .complete(&model, &definition.prompt, &messages, &tools)
                .await?;
            let blocks: Vec<ApiBlock> = response.content.into_iter().filter(ApiBlock::is_known).collect();

            let mut results = Vec::new();
            for block in &blocks {
                if let ApiBlock::ToolUse { id, name, input } = block {
                    let result = if tools.iter().any(|t| &t.name == name) {
                        run_tool(&self.session, name, input).await
                    } else {
                        ToolResult::error(format!("Tool {} is not available", name))
                    };
                    results.push(ApiBlock::tool_result(id.clone(), &result));
                }
            }

            let text = blocks
                .iter()
                .filter_map(|b| match b {
                    ApiBlock::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("\n");
            messages.push(ApiMessage::assistant(blocks));

            if results.is_empty() || response.stop_reason.as_deref() != Some("tool_use") {
                return Ok(text);
            }
            messages.push(ApiMessage::user(results));
        }

        Err(BridgeError::Client(format!(
            "Max tool rounds ({}) exceeded",
            self.client.config.max_tool_rounds
        )))
    }
}

#[async_trait]
impl AgentConnection for AnthropicConnection {
    async fn query(&mut self, prompt: &str) -> Result<()> {
        self.pending.clear();
        self.turn = Some(TurnState {
            start: self.history.len(),
            rounds: 0,
        });
        self.history.push(ApiMessage::user(vec![ApiBlock::Text {
            text: prompt.to_string(),
        }]));
        Ok(())
    }

    async fn receive(&mut self) -> Result<Option<ClientMessage>> {
        loop {
            if let Some(message) = self.pending.pop_front() {
                return Ok(Some(message));
            }
            let Some(state) = self.turn.take() else {
                return Ok(None);
            };

            if state.rounds >= self.client.config.max_tool_rounds {
                tracing::warn!(rounds = state.rounds, "Turn hit the tool round limit");
                return Ok(Some(ClientMessage::error(format!(
                    "Max tool rounds ({}) exceeded",
                    self.client.config.max_tool_rounds
                ))));
            }

            match self.round(state).await {
                Ok(next) => self.turn = next,
                Err(e) => {
                    // Drop the failed turn so the next one starts from valid history
                    self.history.truncate(state.start);
                    return Err(e);
                }
            }
        }
    }
}

fn without_tool_use(blocks: Vec<ApiBlock>) -> Vec<ApiBlock> {
    blocks
        .into_iter()
        .filter(|b| !matches!(b, ApiBlock::ToolUse { .. }))
        .collect()
}

/// Delegate tool advertised when subagents are configured
fn delegate_definition(config: &AgentSessionConfig) -> ToolDefinition {
    let names: Vec<&String> = config.agents.keys().collect();
    let roster = config
        .agents
        .iter()
        .map(|(name, def)| format!("- {}: {}", name, def.description))
        .collect::<Vec<_>>()
        .join("\n");
    ToolDefinition {
        name: DELEGATE_TOOL.to_string(),
        description: format!(
            "Delegate a self-contained task to a specialist subagent.\nAvailable agents:\n{}",
            roster
        ),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "subagent_type": {
                    "type": "string",
                    "enum": names,
                    "description": "Which subagent should handle the task",
                },
                "description": {
                    "type": "string",
                    "description": "Short summary of the task",
                },
                "prompt": {
                    "type": "string",
                    "description": "Full instructions for the subagent",
                },
            },
            "required": ["subagent_type", "prompt"],
        }),
    }
}

// Messages API wire types

#[derive(Debug, Clone, Serialize)]
struct ApiMessage {
    role: &'static str,
    content: Vec<ApiBlock>,
}

impl ApiMessage {
    fn user(content: Vec<ApiBlock>) -> Self {
        Self {
            role: "user",
            content,
        }
    }

    fn assistant(content: Vec<ApiBlock>) -> Self {
        Self {
            role: "assistant",
            content,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        is_error: bool,
    },
    /// Block types this client does not handle (thinking, etc.)
    #[serde(other)]
    Unsupported,
}

impl ApiBlock {
    fn tool_result(tool_use_id: String, result: &ToolResult) -> Self {
        ApiBlock::ToolResult {
            tool_use_id,
            content: result.text_content(),
            is_error: result.is_error,
        }
    }

    fn is_known(&self) -> bool {
        !matches!(self, ApiBlock::Unsupported)
    }

    fn to_content(&self) -> Option<ContentBlock> {
        match self {
            ApiBlock::Text { text } => Some(ContentBlock::Text { text: text.clone() }),
            ApiBlock::ToolUse { id, name, input } => Some(ContentBlock::ToolUse {
                id: id.clone(),
                name: name.clone(),
                input: input.clone(),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    content: Vec<ApiBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: ApiUsage,
}

#[derive(Debug, Default, Deserialize)]
struct ApiUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}
