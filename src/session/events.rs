//! Messages from the agent client and the events a session yields

use super::config::DELEGATE_TOOL;
use serde::{Deserialize, Serialize};

/// One block of an assistant message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    pub fn tool_use(name: impl Into<String>, input: serde_json::Value) -> Self {
        ContentBlock::ToolUse {
            id: format!("toolu-{}", uuid::Uuid::new_v4()),
            name: name.into(),
            input,
        }
    }
}

/// How a turn ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSubtype {
    Success,
    Error,
    /// The turn was cut short by a rate-limit signal; delivered output stands
    RateLimited,
}

/// What an agent connection yields while a turn is in flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Assistant {
        content: Vec<ContentBlock>,
    },
    Result {
        subtype: ResultSubtype,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl ClientMessage {
    pub fn assistant_text(text: impl Into<String>) -> Self {
        ClientMessage::Assistant {
            content: vec![ContentBlock::text(text)],
        }
    }

    pub fn success() -> Self {
        ClientMessage::Result {
            subtype: ResultSubtype::Success,
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ClientMessage::Result {
            subtype: ResultSubtype::Error,
            error: Some(message.into()),
        }
    }
}

/// Event produced by [`AgentSession::events`](super::AgentSession::events)
///
/// Every turn yields zero or more `Assistant`, `ToolUse` and `Delegate`
/// events followed by exactly one `Result`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    Assistant {
        text: String,
    },
    ToolUse {
        name: String,
        input: serde_json::Value,
    },
    /// The agent handed a sub-task to a named subagent
    Delegate {
        agent: String,
    },
    Result {
        subtype: ResultSubtype,
        error: Option<String>,
    },
}

impl SessionEvent {
    /// Translate one content block; blank text yields nothing
    pub fn from_block(block: ContentBlock) -> Option<Self> {
        match block {
            ContentBlock::Text { text } if text.trim().is_empty() => None,
            ContentBlock::Text { text } => Some(SessionEvent::Assistant { text }),
            ContentBlock::ToolUse { name, input, .. } if name == DELEGATE_TOOL => {
                let agent = input
                    .get("subagent_type")
                    .and_then(|v| v.as_str())
                    .unwrap_or("unknown")
                    .to_string();
                Some(SessionEvent::Delegate { agent })
            }
            ContentBlock::ToolUse { name, input, .. } => Some(SessionEvent::ToolUse { name, input }),
        }
    }

    pub fn is_result(&self) -> bool {
        matches!(self, SessionEvent::Result { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blank_text_dropped() {
        assert_eq!(SessionEvent::from_block(ContentBlock::text("  \n")), None);
        assert_eq!(
            SessionEvent::from_block(ContentBlock::text("hi")),
            Some(SessionEvent::Assistant { text: "hi".into() })
        );
    }

    #[test]
    fn test_delegate_detection() {
        let block = ContentBlock::tool_use(DELEGATE_TOOL, json!({"subagent_type": "researcher"}));
        assert_eq!(
            SessionEvent::from_block(block),
            Some(SessionEvent::Delegate {
                agent: "researcher".into()
            })
        );

        let block = ContentBlock::tool_use(DELEGATE_TOOL, json!({}));
        assert_eq!(
            SessionEvent::from_block(block),
            Some(SessionEvent::Delegate {
                agent: "unknown".into()
            })
        );
    }

    #[test]
    fn test_tool_use_passthrough() {
        let block = ContentBlock::tool_use("Bash", json!({"command": "ls"}));
        match SessionEvent::from_block(block) {
            Some(SessionEvent::ToolUse { name, input }) => {
                assert_eq!(name, "Bash");
                assert_eq!(input["command"], "ls");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_client_message_serde() {
        let json = serde_json::to_value(ClientMessage::error("boom")).unwrap();
        assert_eq!(json, json!({"type": "result", "subtype": "error", "error": "boom"}));

        let parsed: ClientMessage =
            serde_json::from_value(json!({"type": "result", "subtype": "rate_limited"})).unwrap();
        assert_eq!(
            parsed,
            ClientMessage::Result {
                subtype: ResultSubtype::RateLimited,
                error: None
            }
        );
    }
}
