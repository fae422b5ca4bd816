//! Shell safety hooks
//!
//! The deny-list is a substring check and is easy to sidestep with
//! equivalent commands. It is a guard rail, not a security boundary.

use super::{HookDecision, HookEvent, HookHandler, HookPoint};

/// Name of the shell-execution tool
pub const SHELL_TOOL: &str = "Bash";

/// Command fragments that are always blocked
pub const DANGEROUS_PATTERNS: &[&str] = &[
    "rm -rf /",
    "rm -rf ~",
    "mkfs",
    "dd if=",
    ":(){:|:&};:",
    "chmod -R 777 /",
    "shutdown",
    "reboot",
    "> /dev/sda",
];

fn is_pre_shell(event: &HookEvent) -> bool {
    event.point == HookPoint::PreToolUse && event.tool_name == SHELL_TOOL
}

/// Blocks shell commands containing a deny-listed fragment
#[derive(Debug, Clone)]
pub struct SafetyGate {
    patterns: Vec<String>,
}

impl Default for SafetyGate {
    fn default() -> Self {
        Self::new()
    }
}

impl SafetyGate {
    pub fn new() -> Self {
        Self::with_patterns(DANGEROUS_PATTERNS.iter().copied())
    }

    pub fn with_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl HookHandler for SafetyGate {
    fn evaluate(&self, event: &HookEvent) -> HookDecision {
        if !is_pre_shell(event) {
            return HookDecision::Approve;
        }
        let command = event.input_str("command").unwrap_or_default();
        match self.patterns.iter().find(|p| command.contains(p.as_str())) {
            Some(pattern) => HookDecision::block(format!("Blocked dangerous command: {}", pattern)),
            None => HookDecision::Approve,
        }
    }
}

/// Blocks every shell call, for agents that must not touch the host
#[derive(Debug, Clone)]
pub struct ShellDisabled {
    reason: String,
}

impl ShellDisabled {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn for_support_agent() -> Self {
        Self::new("Shell commands are disabled for the support agent.")
    }
}

impl HookHandler for ShellDisabled {
    fn evaluate(&self, event: &HookEvent) -> HookDecision {
        if is_pre_shell(event) {
            HookDecision::block(self.reason.clone())
        } else {
            HookDecision::Approve
        }
    }
}
