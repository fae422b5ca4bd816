//! Agent client implementations
//!
//! - [`AnthropicClient`]: Messages API over reqwest, driving a tool-use loop
//! - [`ScriptedClient`]: deterministic replay for tests and offline mode
//!
//! Both honour the same invocation contract for tools and hooks: PreToolUse
//! hooks may veto a call, the owning registry executes it, and PostToolUse
//! hooks observe it afterwards.

mod anthropic;
mod scripted;

pub use anthropic::AnthropicClient;
pub use scripted::{ScriptStep, ScriptedClient};

use crate::hooks::{HookDecision, HookEvent};
use crate::session::AgentSessionConfig;
use crate::tools::ToolResult;

/// Run the PreToolUse hooks; a block becomes the error reply for the call
pub(crate) fn pre_tool_use(
    config: &AgentSessionConfig,
    name: &str,
    input: &serde_json::Value,
) -> Option<ToolResult> {
    match config
        .hooks
        .evaluate(&HookEvent::pre_tool_use(name, input.clone()))
    {
        HookDecision::Approve => None,
        HookDecision::Block { reason } => Some(ToolResult::error(reason)),
    }
}

/// Run the PostToolUse hooks; they observe only
pub(crate) fn post_tool_use(config: &AgentSessionConfig, name: &str, input: &serde_json::Value) {
    let decision = config
        .hooks
        .evaluate(&HookEvent::post_tool_use(name, input.clone()));
    if let Some(reason) = decision.reason() {
        tracing::info!(tool = %name, reason = %reason, "PostToolUse hook flagged a finished call");
    }
}

/// Gate, execute and observe one tool call by its client-facing name
pub(crate) async fn run_tool(
    config: &AgentSessionConfig,
    name: &str,
    input: &serde_json::Value,
) -> ToolResult {
    if let Some(blocked) = pre_tool_use(config, name, input) {
        return blocked;
    }
    let result = match config.resolve_tool(name) {
        Some((registry, local)) => registry.execute_json(&local, input).await,
        None => ToolResult::error(format!("Unknown tool: {}", name)),
    };
    post_tool_use(config, name, input);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::{HookPoint, SafetyGate};
    use crate::tools::{ArgSpec, ToolCallArgs, ToolRegistry};
    use serde_json::json;

    fn config() -> AgentSessionConfig {
        let mut shell = ToolRegistry::builtin();
        shell.register_fn(
            "Bash",
            "Run",
            vec![ArgSpec::required("command", "Command")],
            |args: ToolCallArgs| async move {
                ToolResult::text(format!("ran {}", args.get("command").unwrap_or_default()))
            },
        );
        AgentSessionConfig::builder()
            .mcp_server_allowed(shell)
            .hook(HookPoint::PreToolUse, SafetyGate::new())
            .build()
    }

    #[tokio::test]
    async fn test_run_tool_executes_approved_call() {
        let result = run_tool(&config(), "Bash", &json!({"command": "ls"})).await;
        assert_eq!(result, ToolResult::text("ran ls"));
    }

    #[tokio::test]
    async fn test_run_tool_blocked_by_hook() {
        let result = run_tool(&config(), "Bash", &json!({"command": "sudo reboot"})).await;
        assert!(result.is_error);
        assert_eq!(result.text_content(), "Blocked dangerous command: reboot");
    }

    #[tokio::test]
    async fn test_run_tool_unknown() {
        let result = run_tool(&config(), "Write", &json!({})).await;
        assert!(result.is_error);
        assert_eq!(result.text_content(), "Unknown tool: Write");
    }
}
