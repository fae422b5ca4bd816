//! Session configuration

use crate::hooks::{HookHandler, HookPoint, HookSet};
use crate::tools::{ToolDefinition, ToolRegistry};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Name of the delegate tool the agent uses to hand work to a subagent
pub const DELEGATE_TOOL: &str = "Task";

/// How the agent client treats tool permissions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PermissionMode {
    /// Only tools in `allowed_tools` may run
    #[default]
    Default,
    /// Allowed tools run, and file edits are accepted without asking
    AcceptEdits,
    /// Every registered tool may run
    BypassPermissions,
    /// Planning only; no tool runs
    Plan,
}

/// A named specialist the top-level agent may delegate to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubagentDefinition {
    /// When to use this subagent (shown to the delegating model)
    pub description: String,
    /// System prompt of the subagent
    pub prompt: String,
    /// Tool names the subagent may use
    pub tools: BTreeSet<String>,
    /// Model alias or id
    pub model: String,
}

impl SubagentDefinition {
    pub fn new(description: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            prompt: prompt.into(),
            tools: BTreeSet::new(),
            model: "haiku".to_string(),
        }
    }

    pub fn with_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools.extend(tools.into_iter().map(Into::into));
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// Fixed configuration of one agent session
///
/// Built once by whoever opens the session and shared behind `Arc`; it does
/// not change for the session's lifetime.
#[derive(Debug, Clone, Default)]
pub struct AgentSessionConfig {
    pub system_prompt: String,
    pub model: String,
    pub allowed_tools: BTreeSet<String>,
    /// In-process tool servers keyed by server name
    pub mcp_servers: BTreeMap<String, Arc<ToolRegistry>>,
    /// Built-in tools addressed by bare name
    pub builtin_tools: Option<Arc<ToolRegistry>>,
    pub permission_mode: PermissionMode,
    pub hooks: HookSet,
    pub agents: BTreeMap<String, SubagentDefinition>,
}

impl AgentSessionConfig {
    pub fn builder() -> AgentSessionConfigBuilder {
        AgentSessionConfigBuilder::default()
    }

    /// Whether the agent may call `name`
    pub fn is_tool_allowed(&self, name: &str) -> bool {
        match self.permission_mode {
            PermissionMode::Plan => false,
            PermissionMode::BypassPermissions => true,
            PermissionMode::Default | PermissionMode::AcceptEdits => {
                self.allowed_tools.contains(name)
            }
        }
    }

    /// Find the registry owning a client-facing tool name
    ///
    /// Returns the registry and the tool's local name.
    pub fn resolve_tool(&self, name: &str) -> Option<(Arc<ToolRegistry>, String)> {
        if let Some(builtins) = &self.builtin_tools {
            if let Some(local) = builtins.resolve_qualified(name) {
                return Some((builtins.clone(), local.to_string()));
            }
        }
        self.mcp_servers.values().find_map(|registry| {
            registry
                .resolve_qualified(name)
                .map(|local| (registry.clone(), local.to_string()))
        })
    }

    /// Every registered tool the agent may call, under client-facing names
    pub fn available_tools(&self) -> Vec<ToolDefinition> {
        self.builtin_tools
            .iter()
            .chain(self.mcp_servers.values())
            .flat_map(|registry| registry.definitions())
            .filter(|def| self.is_tool_allowed(&def.name))
            .collect()
    }

    /// Whether the delegate tool should be offered
    pub fn can_delegate(&self) -> bool {
        !self.agents.is_empty() && self.is_tool_allowed(DELEGATE_TOOL)
    }
}

/// Builder for [`AgentSessionConfig`]
#[derive(Debug, Default)]
pub struct AgentSessionConfigBuilder {
    config: AgentSessionConfig,
}

impl AgentSessionConfigBuilder {
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn allow_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config
            .allowed_tools
            .extend(tools.into_iter().map(Into::into));
        self
    }

    /// Attach a tool server without allowing its tools
    pub fn mcp_server(mut self, registry: ToolRegistry) -> Self {
        match registry.server().map(str::to_string) {
            Some(server) => {
                self.config.mcp_servers.insert(server, Arc::new(registry));
            }
            None => self.config.builtin_tools = Some(Arc::new(registry)),
        }
        self
    }

    /// Attach a tool server and allow every tool on it
    pub fn mcp_server_allowed(self, registry: ToolRegistry) -> Self {
        let names: Vec<String> = registry
            .names()
            .iter()
            .map(|n| registry.qualified_name(n))
            .collect();
        self.allow_tools(names).mcp_server(registry)
    }

    pub fn permission_mode(mut self, mode: PermissionMode) -> Self {
        self.config.permission_mode = mode;
        self
    }

    pub fn hook(mut self, point: HookPoint, handler: impl HookHandler + 'static) -> Self {
        self.config.hooks.register(point, handler);
        self
    }

    pub fn agent(mut self, name: impl Into<String>, definition: SubagentDefinition) -> Self {
        self.config.agents.insert(name.into(), definition);
        self
    }

    pub fn build(self) -> AgentSessionConfig {
        self.config
    }
}
