//! Meeting-prep tools: save and list briefings

use super::types::{ArgSpec, Tool, ToolCallArgs, ToolResult};
use super::ToolRegistry;
use crate::error::Result;
use crate::store::{BriefingStore, ToolStore};
use async_trait::async_trait;
use std::sync::Arc;

/// Server name for the meeting-prep tool set
pub const PREP_SERVER: &str = "prep";

/// `prep` registry: save_briefing, list_briefings
pub fn prep_tools(store: &ToolStore) -> ToolRegistry {
    ToolRegistry::new(PREP_SERVER)
        .with_tool(Arc::new(SaveBriefingTool {
            briefings: store.briefings.clone(),
        }))
        .with_tool(Arc::new(ListBriefingsTool {
            briefings: store.briefings.clone(),
        }))
}

pub struct SaveBriefingTool {
    briefings: Arc<BriefingStore>,
}

#[async_trait]
impl Tool for SaveBriefingTool {
    fn name(&self) -> &str {
        "save_briefing"
    }

    fn description(&self) -> &str {
        "Save a meeting briefing document as a markdown file"
    }

    fn args(&self) -> Vec<ArgSpec> {
        vec![
            ArgSpec::required("company_name", "Company the meeting is with"),
            ArgSpec::required("content", "Briefing body in markdown"),
            ArgSpec::optional("meeting_date", "YYYY-MM-DD (default today)"),
        ]
    }

    async fn call(&self, args: &ToolCallArgs) -> Result<ToolResult> {
        let file_name = self
            .briefings
            .save(
                args.require("company_name")?,
                args.require("content")?,
                args.get("meeting_date"),
            )
            .await?;
        Ok(ToolResult::text(format!("Briefing saved: {}", file_name)))
    }
}

pub struct ListBriefingsTool {
    briefings: Arc<BriefingStore>,
}

#[async_trait]
impl Tool for ListBriefingsTool {
    fn name(&self) -> &str {
        "list_briefings"
    }

    fn description(&self) -> &str {
        "List saved meeting briefings"
    }

    fn args(&self) -> Vec<ArgSpec> {
        vec![ArgSpec::optional("search", "Filter by company or date")]
    }

    async fn call(&self, args: &ToolCallArgs) -> Result<ToolResult> {
        let names = self.briefings.list(args.get("search")).await?;
        if names.is_empty() {
            return Ok(ToolResult::text("No briefings found."));
        }
        Ok(ToolResult::text(names.join("\n")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;

    #[tokio::test]
    async fn test_save_then_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = ToolStore::open(&StorageConfig::rooted_at(dir.path()))
            .await
            .unwrap();
        let reg = prep_tools(&store);

        let empty = reg.execute("list_briefings", &ToolCallArgs::new()).await;
        assert_eq!(empty.text_content(), "No briefings found.");

        let saved = reg
            .execute(
                "save_briefing",
                &ToolCallArgs::new()
                    .with("company_name", "Stripe")
                    .with("content", "# Stripe\nPayments.")
                    .with("meeting_date", "2026-04-02"),
            )
            .await;
        assert_eq!(
            saved.text_content(),
            "Briefing saved: 2026-04-02_stripe_briefing.md"
        );

        let listed = reg
            .execute("list_briefings", &ToolCallArgs::new().with("search", "stripe"))
            .await;
        assert_eq!(listed.text_content(), "2026-04-02_stripe_briefing.md");
    }
}
