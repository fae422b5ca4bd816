//! Core types for agent-callable tools

use crate::error::{BridgeError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Arguments of one tool call: string keys to string values
///
/// Model-provided JSON is flattened on the way in. Strings pass through,
/// other scalars are stringified, `null` is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolCallArgs(BTreeMap<String, String>);

impl ToolCallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(value: &serde_json::Value) -> Self {
        let map = match value.as_object() {
            Some(obj) => obj
                .iter()
                .filter_map(|(k, v)| {
                    let s = match v {
                        serde_json::Value::Null => return None,
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    Some((k.clone(), s))
                })
                .collect(),
            None => BTreeMap::new(),
        };
        Self(map)
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Value for `key`, treating blank strings as absent
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Value for a required `key`
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key)
            .ok_or_else(|| BridgeError::InvalidInput(format!("Missing required argument: {}", key)))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// Declared argument of a tool; every argument is a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgSpec {
    pub name: String,
    pub description: String,
    pub required: bool,
}

impl ArgSpec {
    pub fn required(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required: false,
        }
    }
}

/// JSON Schema object for a list of string arguments
pub fn input_schema(args: &[ArgSpec]) -> serde_json::Value {
    let properties: serde_json::Map<String, serde_json::Value> = args
        .iter()
        .map(|a| {
            (
                a.name.clone(),
                serde_json::json!({ "type": "string", "description": a.description }),
            )
        })
        .collect();
    let required: Vec<&str> = args
        .iter()
        .filter(|a| a.required)
        .map(|a| a.name.as_str())
        .collect();

    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// One part of a tool reply; only text is produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentPart {
    Text { text: String },
}

/// Structured tool reply: `{"content":[{"type":"text","text":...}]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: Vec<ContentPart>,
    /// Set when the call failed for a reason other than bad input
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentPart::Text { text: text.into() }],
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentPart::Text { text: text.into() }],
            is_error: true,
        }
    }

    /// All text parts joined with newlines
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .map(|part| match part {
                ContentPart::Text { text } => text.as_str(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Tool definition advertised to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// Tool trait, the unit registered in a [`ToolRegistry`](super::ToolRegistry)
///
/// `call` should finish all side effects before returning. Returning
/// `BridgeError::InvalidInput` or `BridgeError::NotFound` produces a plain
/// text reply; any other error becomes an error reply. Errors never reach
/// the agent client.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name, unique within its registry
    fn name(&self) -> &str;

    /// Human-readable description for the model
    fn description(&self) -> &str;

    /// Declared arguments
    fn args(&self) -> Vec<ArgSpec>;

    /// Execute the tool
    async fn call(&self, args: &ToolCallArgs) -> Result<ToolResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_from_json_stringifies() {
        let args = ToolCallArgs::from_json(&serde_json::json!({
            "item": 2,
            "action": "complete",
            "urgent": true,
            "missing": null,
        }));
        assert_eq!(args.get("item"), Some("2"));
        assert_eq!(args.get("action"), Some("complete"));
        assert_eq!(args.get("urgent"), Some("true"));
        assert!(!args.contains("missing"));
    }

    #[test]
    fn test_blank_is_absent() {
        let args = ToolCallArgs::new().with("tags", "  ");
        assert!(args.get("tags").is_none());
        assert!(args.require("tags").is_err());
    }

    #[test]
    fn test_result_wire_shape() {
        let json = serde_json::to_value(ToolResult::text("Added: milk")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"content": [{"type": "text", "text": "Added: milk"}]})
        );

        let json = serde_json::to_value(ToolResult::error("boom")).unwrap();
        assert_eq!(json["is_error"], true);
    }

    #[test]
    fn test_input_schema() {
        let schema = input_schema(&[
            ArgSpec::required("query", "Search words"),
            ArgSpec::optional("limit", "Max results"),
        ]);
        assert_eq!(schema["properties"]["query"]["type"], "string");
        assert_eq!(schema["required"], serde_json::json!(["query"]));
    }
}
