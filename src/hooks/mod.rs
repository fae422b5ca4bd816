//! Hooks
//!
//! Interception points around tool execution. Hooks are registered per
//! [`HookPoint`] and evaluated in registration order; the first
//! [`HookDecision::Block`] stops evaluation and vetoes the tool call.
//!
//! ## Hook Points
//!
//! - `PreToolUse`: before a tool runs (can block)
//! - `PostToolUse`: after a tool ran (observe only; a block is logged)
//!
//! ## Example
//!
//! ```rust
//! use a3s_bridge::hooks::{HookDecision, HookEvent, HookPoint, HookSet, SafetyGate};
//!
//! let mut hooks = HookSet::new();
//! hooks.register(HookPoint::PreToolUse, SafetyGate::new());
//!
//! let event = HookEvent::new(
//!     HookPoint::PreToolUse,
//!     "Bash",
//!     serde_json::json!({"command": "sudo reboot"}),
//! );
//! assert!(hooks.evaluate(&event).is_block());
//! ```

mod engine;
mod safety;

pub use engine::{Hook, HookHandler, HookSet};
pub use safety::{SafetyGate, ShellDisabled, DANGEROUS_PATTERNS, SHELL_TOOL};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Points at which hooks fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HookPoint {
    PreToolUse,
    PostToolUse,
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookPoint::PreToolUse => write!(f, "PreToolUse"),
            HookPoint::PostToolUse => write!(f, "PostToolUse"),
        }
    }
}

/// What a hook sees: the point, the tool name and the tool's raw input
#[derive(Debug, Clone, PartialEq)]
pub struct HookEvent {
    pub point: HookPoint,
    pub tool_name: String,
    pub tool_input: serde_json::Value,
}

impl HookEvent {
    pub fn new(point: HookPoint, tool_name: impl Into<String>, tool_input: serde_json::Value) -> Self {
        Self {
            point,
            tool_name: tool_name.into(),
            tool_input,
        }
    }

    pub fn pre_tool_use(tool_name: impl Into<String>, tool_input: serde_json::Value) -> Self {
        Self::new(HookPoint::PreToolUse, tool_name, tool_input)
    }

    pub fn post_tool_use(tool_name: impl Into<String>, tool_input: serde_json::Value) -> Self {
        Self::new(HookPoint::PostToolUse, tool_name, tool_input)
    }

    /// String field of the tool input, if present
    pub fn input_str(&self, key: &str) -> Option<&str> {
        self.tool_input.get(key).and_then(|v| v.as_str())
    }
}

/// Hook verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookDecision {
    Approve,
    Block { reason: String },
}

impl HookDecision {
    pub fn block(reason: impl Into<String>) -> Self {
        HookDecision::Block {
            reason: reason.into(),
        }
    }

    pub fn is_block(&self) -> bool {
        matches!(self, HookDecision::Block { .. })
    }

    pub fn is_approve(&self) -> bool {
        matches!(self, HookDecision::Approve)
    }

    /// Block reason, if blocked
    pub fn reason(&self) -> Option<&str> {
        match self {
            HookDecision::Approve => None,
            HookDecision::Block { reason } => Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hook_point_display() {
        assert_eq!(HookPoint::PreToolUse.to_string(), "PreToolUse");
        assert_eq!(HookPoint::PostToolUse.to_string(), "PostToolUse");
    }

    #[test]
    fn test_decision_helpers() {
        let block = HookDecision::block("nope");
        assert!(block.is_block());
        assert_eq!(block.reason(), Some("nope"));
        assert!(HookDecision::Approve.is_approve());
        assert_eq!(HookDecision::Approve.reason(), None);
    }

    #[test]
    fn test_input_str() {
        let event = HookEvent::pre_tool_use("Bash", serde_json::json!({"command": "ls", "n": 1}));
        assert_eq!(event.input_str("command"), Some("ls"));
        assert_eq!(event.input_str("n"), None);
    }
}
