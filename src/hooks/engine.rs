//! Hook set
//!
//! Ordered registration list of hooks, evaluated first-block-wins.

use super::{HookDecision, HookEvent, HookPoint};
use std::fmt;
use std::sync::Arc;

/// Hook handler trait
///
/// Implemented by the safety gate and by any closure
/// `Fn(&HookEvent) -> HookDecision`.
pub trait HookHandler: Send + Sync {
    fn evaluate(&self, event: &HookEvent) -> HookDecision;
}

impl<F> HookHandler for F
where
    F: Fn(&HookEvent) -> HookDecision + Send + Sync,
{
    fn evaluate(&self, event: &HookEvent) -> HookDecision {
        self(event)
    }
}

/// One registered hook
#[derive(Clone)]
pub struct Hook {
    pub id: String,
    pub point: HookPoint,
    /// Only fire for this tool name; `None` matches every tool
    pub tool: Option<String>,
    handler: Arc<dyn HookHandler>,
}

impl Hook {
    /// Check if an event matches this hook
    pub fn matches(&self, event: &HookEvent) -> bool {
        if event.point != self.point {
            return false;
        }
        match &self.tool {
            Some(tool) => *tool == event.tool_name,
            None => true,
        }
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("id", &self.id)
            .field("point", &self.point)
            .field("tool", &self.tool)
            .finish()
    }
}

/// Hooks attached to a session, in registration order
#[derive(Clone, Debug, Default)]
pub struct HookSet {
    hooks: Vec<Hook>,
}

impl HookSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook for every tool at `point`
    pub fn register(&mut self, point: HookPoint, handler: impl HookHandler + 'static) -> &mut Self {
        self.push(point, None, Arc::new(handler))
    }

    /// Register a hook that only fires for `tool`
    pub fn register_for_tool(
        &mut self,
        point: HookPoint,
        tool: impl Into<String>,
        handler: impl HookHandler + 'static,
    ) -> &mut Self {
        self.push(point, Some(tool.into()), Arc::new(handler))
    }

    /// Builder-style [`register`](Self::register)
    pub fn with(mut self, point: HookPoint, handler: impl HookHandler + 'static) -> Self {
        self.register(point, handler);
        self
    }

    fn push(
        &mut self,
        point: HookPoint,
        tool: Option<String>,
        handler: Arc<dyn HookHandler>,
    ) -> &mut Self {
        let id = format!("hook-{}", self.hooks.len() + 1);
        tracing::debug!(hook_id = %id, point = %point, tool = ?tool, "Hook registered");
        self.hooks.push(Hook {
            id,
            point,
            tool,
            handler,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Hooks registered for `point`, in order
    pub fn hooks_for(&self, point: HookPoint) -> impl Iterator<Item = &Hook> {
        self.hooks.iter().filter(move |h| h.point == point)
    }

    /// Evaluate matching hooks in registration order; the first block wins
    pub fn evaluate(&self, event: &HookEvent) -> HookDecision {
        for hook in self.hooks.iter().filter(|h| h.matches(event)) {
            let decision = hook.handler.evaluate(event);
            if let HookDecision::Block { ref reason } = decision {
                tracing::info!(
                    hook_id = %hook.id,
                    point = %event.point,
                    tool = %event.tool_name,
                    reason = %reason,
                    "Hook blocked tool call"
                );
                return decision;
            }
        }
        HookDecision::Approve
    }
}
