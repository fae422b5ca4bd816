//! Tool Registry
//!
//! A named group of tools (an in-process "MCP server"). Registries are built
//! once at startup and then shared immutably by every session using them.

use super::types::{input_schema, ArgSpec, Tool, ToolCallArgs, ToolDefinition, ToolResult};
use crate::error::{BridgeError, Result};
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::Instrument;

/// Tool registry for one server
pub struct ToolRegistry {
    /// `None` for built-in tools, which are addressed by their bare name
    server: Option<String>,
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry whose tools are addressed as `mcp__{server}__{tool}`
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: Some(server.into()),
            tools: BTreeMap::new(),
        }
    }

    /// Create an empty registry of built-in tools, addressed by bare name
    pub fn builtin() -> Self {
        Self {
            server: None,
            tools: BTreeMap::new(),
        }
    }

    pub fn server(&self) -> Option<&str> {
        self.server.as_deref()
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> &mut Self {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_some() {
            tracing::warn!(tool = %name, "Replaced existing tool registration");
        } else {
            tracing::debug!(tool = %name, server = ?self.server, "Registering tool");
        }
        self
    }

    /// Builder-style [`register`](Self::register)
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    /// Register a closure as a tool
    pub fn register_fn<F, Fut>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        args: Vec<ArgSpec>,
        handler: F,
    ) -> &mut Self
    where
        F: Fn(ToolCallArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ToolResult> + Send + 'static,
    {
        let tool = FnTool {
            name: name.into(),
            description: description.into(),
            args,
            handler: Box::new(move |a| -> BoxFuture<'static, ToolResult> { Box::pin(handler(a)) }),
        };
        self.register(Arc::new(tool))
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Registered tool names, sorted
    pub fn names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Name the agent client uses for `tool`
    pub fn qualified_name(&self, tool: &str) -> String {
        match &self.server {
            Some(server) => format!("mcp__{}__{}", server, tool),
            None => tool.to_string(),
        }
    }

    /// Map a qualified name back to a tool name in this registry
    pub fn resolve_qualified<'a>(&self, qualified: &'a str) -> Option<&'a str> {
        let local = match &self.server {
            Some(server) => qualified
                .strip_prefix("mcp__")?
                .strip_prefix(server.as_str())?
                .strip_prefix("__")?,
            None => qualified,
        };
        self.contains(local).then_some(local)
    }

    /// Definitions for every tool, under their qualified names
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|tool| ToolDefinition {
                name: self.qualified_name(tool.name()),
                description: tool.description().to_string(),
                input_schema: input_schema(&tool.args()),
            })
            .collect()
    }

    /// Execute a tool by name
    ///
    /// Never fails: unknown tools, missing arguments and handler errors all
    /// come back as a text reply.
    pub async fn execute(&self, name: &str, args: &ToolCallArgs) -> ToolResult {
        let span = tracing::info_span!(
            "a3s.tool.execute",
            "a3s.tool.name" = %name,
            "a3s.tool.server" = ?self.server,
            "a3s.tool.error" = tracing::field::Empty,
            "a3s.tool.duration_ms" = tracing::field::Empty,
        );
        async {
            let start = std::time::Instant::now();
            let result = self.dispatch(name, args).await;

            let span = tracing::Span::current();
            span.record("a3s.tool.error", result.is_error);
            span.record("a3s.tool.duration_ms", start.elapsed().as_millis() as u64);
            result
        }
        .instrument(span)
        .await
    }

    /// Execute with raw JSON input from the model
    pub async fn execute_json(&self, name: &str, input: &serde_json::Value) -> ToolResult {
        self.execute(name, &ToolCallArgs::from_json(input)).await
    }

    async fn dispatch(&self, name: &str, args: &ToolCallArgs) -> ToolResult {
        let Some(tool) = self.get(name) else {
            return ToolResult::error(format!("Unknown tool: {}", name));
        };

        if let Some(missing) = tool
            .args()
            .iter()
            .find(|spec| spec.required && !args.contains(&spec.name))
        {
            return ToolResult::text(format!("Missing required argument: {}", missing.name));
        }

        match tool.call(args).await {
            Ok(result) => result,
            Err(BridgeError::InvalidInput(msg)) | Err(BridgeError::NotFound(msg)) => {
                ToolResult::text(msg)
            }
            Err(e) => {
                tracing::warn!(tool = %name, error = %e, "Tool call failed");
                ToolResult::error(format!("Error: {}", e))
            }
        }
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("server", &self.server())
            .field("tools", &self.names())
            .finish()
    }
}

type Handler = Box<dyn Fn(ToolCallArgs) -> BoxFuture<'static, ToolResult> + Send + Sync>;

/// Closure-backed tool created by [`ToolRegistry::register_fn`]
struct FnTool {
    name: String,
    description: String,
    args: Vec<ArgSpec>,
    handler: Handler,
}

#[async_trait]
impl Tool for FnTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn args(&self) -> Vec<ArgSpec> {
        self.args.clone()
    }

    async fn call(&self, args: &ToolCallArgs) -> Result<ToolResult> {
        Ok((self.handler)(args.clone()).await)
    }
}
