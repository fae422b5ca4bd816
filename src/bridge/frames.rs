//! Socket frames

use crate::session::{ResultSubtype, SessionEvent};
use serde::{Deserialize, Serialize};

/// Frame sent to the socket client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundFrame {
    Status { text: String },
    Assistant { text: String },
    Tool { text: String },
    Error { text: String },
    Done,
}

impl OutboundFrame {
    pub fn status(text: impl Into<String>) -> Self {
        OutboundFrame::Status { text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        OutboundFrame::Error { text: text.into() }
    }

    pub fn unknown_agent(agent_id: &str) -> Self {
        Self::error(format!("Unknown agent: {}", agent_id))
    }

    /// Frame for one session event; `Result` events only surface errors
    pub fn from_event(event: SessionEvent) -> Option<Self> {
        match event {
            SessionEvent::Assistant { text } => Some(OutboundFrame::Assistant { text }),
            SessionEvent::ToolUse { name, .. } => Some(OutboundFrame::Tool {
                text: format!("Using: {}", name),
            }),
            SessionEvent::Delegate { agent } => Some(OutboundFrame::Tool {
                text: format!("Delegating to: {}", agent),
            }),
            SessionEvent::Result {
                subtype: ResultSubtype::Error,
                error,
            } => Some(Self::error(error.unwrap_or_else(|| "Unknown error".to_string()))),
            SessionEvent::Result { .. } => None,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from(r#"{"type":"done"}"#))
    }
}

/// Frame received from the socket client
#[derive(Debug, Clone, Deserialize)]
pub struct InboundFrame {
    #[serde(default)]
    pub text: String,
}

impl InboundFrame {
    /// Turn text, or `None` for malformed or blank frames
    pub fn parse(raw: &str) -> Option<String> {
        let frame: InboundFrame = serde_json::from_str(raw).ok()?;
        (!frame.text.trim().is_empty()).then_some(frame.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shapes() {
        assert_eq!(
            serde_json::to_value(OutboundFrame::status("Thinking...")).unwrap(),
            json!({"type": "status", "text": "Thinking..."})
        );
        assert_eq!(
            serde_json::to_value(OutboundFrame::Done).unwrap(),
            json!({"type": "done"})
        );
        assert_eq!(
            OutboundFrame::unknown_agent("nope").to_json(),
            r#"{"type":"error","text":"Unknown agent: nope"}"#
        );
    }

    #[test]
    fn test_from_event() {
        let tool = SessionEvent::ToolUse {
            name: "mcp__support__check_order".into(),
            input: json!({}),
        };
        assert_eq!(
            OutboundFrame::from_event(tool),
            Some(OutboundFrame::Tool {
                text: "Using: mcp__support__check_order".into()
            })
        );

        let delegate = SessionEvent::Delegate {
            agent: "writer".into(),
        };
        assert_eq!(
            OutboundFrame::from_event(delegate),
            Some(OutboundFrame::Tool {
                text: "Delegating to: writer".into()
            })
        );

        let failed = SessionEvent::Result {
            subtype: ResultSubtype::Error,
            error: Some("overloaded".into()),
        };
        assert_eq!(
            OutboundFrame::from_event(failed),
            Some(OutboundFrame::error("overloaded"))
        );

        for subtype in [ResultSubtype::Success, ResultSubtype::RateLimited] {
            let done = SessionEvent::Result { subtype, error: None };
            assert_eq!(OutboundFrame::from_event(done), None);
        }
    }

    #[test]
    fn test_inbound_parse() {
        assert_eq!(InboundFrame::parse(r#"{"text":" hello "}"#), Some(" hello ".into()));
        assert_eq!(InboundFrame::parse(r#"{"text":"   "}"#), None);
        assert_eq!(InboundFrame::parse(r#"{"other":1}"#), None);
        assert_eq!(InboundFrame::parse("not json"), None);
        assert_eq!(InboundFrame::parse(r#"{"text":5}"#), None);
    }
}
